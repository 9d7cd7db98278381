//! Minimal identity provider engine.
//!
//! Serves the endpoints the rest of the system depends on:
//! - Token endpoint (`client_credentials` grant)
//! - Discovery document
//! - JSON Web Key Set
//!
//! All client, scope and resource lookups go to the seeded configuration
//! store. The signing credential is the one handed over by the bootstrap.

pub mod cleanup;
pub mod discovery;
pub mod token;
pub mod validation;

use crate::config::AppConfig;
use crate::credential::SigningCredential;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

pub use validation::{JwtValidator, Principal, TokenError, TokenValidator};

/// Tag for OpenAPI documentation.
pub const ENGINE_TAG: &str = "Identity Provider";

pub const TOKEN_PATH: &str = "/connect/token";
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
pub const JWKS_PATH: &str = "/.well-known/openid-configuration/jwks";

#[derive(Clone)]
pub struct EngineState {
    pub db: Arc<DatabaseConnection>,
    pub credential: Arc<SigningCredential>,
    /// Issuer written into tokens and the discovery document, without trailing slash
    pub issuer: String,
    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,
}

impl EngineState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        credential: Arc<SigningCredential>,
        config: &AppConfig,
    ) -> Self {
        Self {
            db,
            credential,
            issuer: config.issuer_url.trim_end_matches('/').to_string(),
            access_token_lifetime: config.access_token_lifetime,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.issuer, path)
    }

    /// Audience used when no API resource protects the granted scopes.
    pub fn default_audience(&self) -> String {
        format!("{}/resources", self.issuer)
    }
}

/// Claims of an access token issued by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub aud: Vec<String>,
    pub client_id: String,
    #[serde(default)]
    pub scope: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub jti: String,
}

/// Creates the engine router.
pub fn router(state: EngineState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(token::token))
        .routes(routes!(discovery::openid_configuration))
        .routes(routes!(discovery::jwks))
        .with_state(state)
}
