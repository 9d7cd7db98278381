//! Process bootstrap.
//!
//! The authorization server reaches a servable state in a fixed order:
//! connect, migrate every store, seed, provision the signing credential,
//! build the engine and assemble the pipeline. Each step must succeed before
//! the next one starts and the listener is bound only afterwards.

use crate::AppResources;
use crate::api;
use crate::catalog::Catalog;
use crate::config::{AppConfig, ResourceApiConfig};
use crate::credential::{self, SigningCredential};
use crate::engine::{EngineState, JwtValidator, TokenValidator};
use crate::entity::client;
use crate::error::BootstrapError;
use crate::migrate::migrate_all;
use crate::pipeline::{
    self, Authentication, AuthorizationPolicy, CorsPolicy, Requirement, Stage,
};
use crate::seed::{SeedReport, Seeder};
use axum::Router;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::info;

/// A ready-to-serve authorization server.
pub struct Authority {
    pub router: Router,
    pub resources: AppResources,
    pub credential: Arc<SigningCredential>,
    pub seed_report: SeedReport,
}

/// Connect to the configured database and bootstrap with the standard catalog.
pub async fn authorization_server(config: AppConfig) -> Result<Authority, BootstrapError> {
    let db = Database::connect(&config.database_url)
        .await
        .map_err(BootstrapError::Connect)?;
    authorization_server_with(Arc::new(db), Arc::new(config), &Catalog::standard()).await
}

#[tracing::instrument(skip_all, fields(issuer = %config.issuer_url))]
pub async fn authorization_server_with(
    db: Arc<DatabaseConnection>,
    config: Arc<AppConfig>,
    catalog: &Catalog,
) -> Result<Authority, BootstrapError> {
    migrate_all(&db).await?;
    let seed_report = Seeder::new(&db).seed(catalog).await?;
    let credential = Arc::new(credential::provision(&config.signing_credential)?);

    let origins = allowed_origins(&db, &config).await?;
    let state = EngineState::new(db.clone(), credential.clone(), &config);
    let validator = JwtValidator::local(&credential, &config.issuer_url, None);

    let router = pipeline::assemble(vec![
        Stage::Cors(CorsPolicy::new(origins)),
        Stage::Authentication(Authentication::new(Arc::new(validator))),
        Stage::Authorization(AuthorizationPolicy::new(Requirement::AllowAnonymous)),
        Stage::Routing(api::authority_routes(state)),
    ])?;

    info!(
        kid = credential.kid(),
        seeded = seed_report.total_inserted(),
        "authorization server ready"
    );
    Ok(Authority {
        router,
        resources: AppResources { db, config },
        credential,
        seed_report,
    })
}

/// Configured origins plus every enabled client's CORS origins.
async fn allowed_origins(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Vec<String>, DbErr> {
    let mut origins = config.cors.normalized_origins();
    let clients = client::Entity::find()
        .filter(client::Column::Enabled.eq(true))
        .all(db)
        .await?;
    for client in clients {
        origins.extend(client.cors_origins_list());
    }
    Ok(origins)
}

/// Bootstrap the resource API against its authority's published keys.
pub fn resource_api(config: &ResourceApiConfig) -> Result<Router, BootstrapError> {
    let validator = JwtValidator::remote(&config.authority, &config.api_name)?;
    resource_api_with(Arc::new(validator), config)
}

#[tracing::instrument(skip_all, fields(authority = %config.authority, audience = %config.api_name))]
pub fn resource_api_with(
    validator: Arc<dyn TokenValidator>,
    config: &ResourceApiConfig,
) -> Result<Router, BootstrapError> {
    let router = pipeline::assemble(vec![
        Stage::Cors(CorsPolicy::new(config.cors.normalized_origins())),
        Stage::Authentication(Authentication::new(validator)),
        Stage::Authorization(
            AuthorizationPolicy::new(Requirement::Authenticated).allow_anonymous("/healthz"),
        ),
        Stage::Routing(api::resource_routes()),
    ])?;
    info!("resource API ready");
    Ok(router)
}
