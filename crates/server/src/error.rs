use crate::config::ConfigError;
use crate::credential::CredentialError;
use crate::engine::TokenError;
use crate::migrate::MigrationError;
use crate::pipeline::PipelineError;
use crate::seed::SeedError;
use sea_orm::DbErr;
use thiserror::Error;

/// Anything that stops a process from reaching the point where it serves.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database connection failed: {0}")]
    Connect(#[source] DbErr),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),
    #[error("Signing credential unavailable: {0}")]
    Credential(#[from] CredentialError),
    #[error("Token validation setup failed: {0}")]
    Validator(#[from] TokenError),
    #[error("Pipeline assembly failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}
