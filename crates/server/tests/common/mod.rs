//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use oidc_authority::config::{
    AppConfig, CorsConfig, ResourceApiConfig, SigningCredentialConfig,
};
use oidc_authority::migrate::migrate_all;
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;

pub const ISSUER: &str = "https://localhost:5001";

/// A fresh in-memory database with every store migrated.
pub async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");
    migrate_all(&db).await.expect("migrate");
    db
}

pub fn test_config(issuer: &str) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        issuer_url: issuer.into(),
        access_token_lifetime: 3600,
        token_cleanup_interval_secs: 3600,
        cors: CorsConfig {
            allowed_origins: vec!["https://app.test".into()],
        },
        signing_credential: SigningCredentialConfig::default(),
    }
}

pub fn resource_config(authority: &str) -> ResourceApiConfig {
    ResourceApiConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        authority: authority.into(),
        api_name: "api1".into(),
        cors: CorsConfig::default(),
    }
}
