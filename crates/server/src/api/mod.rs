//! HTTP endpoints outside the identity provider engine.
//!
//! - `health` - Health check endpoint (/healthz)
//! - `identity` - Resource API claims endpoint (/identity)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod health;
pub mod identity;
pub mod openapi;

pub use health::MISC_TAG;

use crate::engine::{self, EngineState};
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

pub const DOCS_PATH: &str = "/api-docs";

/// Routes of the authorization server: engine endpoints, health and docs.
pub fn authority_routes(state: EngineState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(engine::router(state))
        .routes(routes!(health::health))
        .split_for_parts();

    router.merge(Redoc::with_url(DOCS_PATH, api))
}

/// Routes of the protected resource API.
pub fn resource_routes() -> Router {
    let (router, _api) = OpenApiRouter::new()
        .routes(routes!(identity::identity))
        .routes(routes!(health::health))
        .split_for_parts();
    router
}
