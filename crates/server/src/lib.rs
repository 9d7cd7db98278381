//! Bootstrap and provisioning layer for an OpenID Connect authorization server.
//!
//! On start the server migrates its stores, seeds the static configuration
//! catalog, provisions a signing credential and assembles the HTTP pipeline
//! before it accepts a single request.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

pub mod api;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod engine;
pub mod entity;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod pipeline;
pub mod seed;

#[derive(Clone, Debug)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}
