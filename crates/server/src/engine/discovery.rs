//! Discovery document and key set.

use crate::engine::{ENGINE_TAG, EngineState, JWKS_PATH, TOKEN_PATH};
use crate::entity::{api_scope, identity_resource};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OpenIdConfiguration {
    pub issuer: String,
    pub jwks_uri: String,
    pub token_endpoint: String,
    pub grant_types_supported: Vec<String>,
    pub scopes_supported: Vec<String>,
    pub claims_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub id_token_signing_alg_values_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
}

/// OpenID Connect Discovery document.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    tag = ENGINE_TAG,
    operation_id = "OpenID Connect Discovery",
    summary = "OpenID Connect Discovery document",
    description = "Returns the provider metadata: issuer, token and key set endpoints, \
                   and the scopes and claims published from the configuration store.",
    responses(
        (status = 200, description = "OpenID Connect configuration document", body = OpenIdConfiguration),
    )
)]
pub async fn openid_configuration(State(state): State<EngineState>) -> Response {
    match build_configuration(&state).await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => {
            error!("Failed to build discovery document: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn build_configuration(state: &EngineState) -> Result<OpenIdConfiguration, DbErr> {
    let identity = identity_resource::Entity::find()
        .filter(identity_resource::Column::Enabled.eq(true))
        .filter(identity_resource::Column::ShowInDiscoveryDocument.eq(true))
        .all(state.db.as_ref())
        .await?;
    let api = api_scope::Entity::find()
        .filter(api_scope::Column::Enabled.eq(true))
        .filter(api_scope::Column::ShowInDiscoveryDocument.eq(true))
        .all(state.db.as_ref())
        .await?;

    let mut claims: Vec<String> = identity
        .iter()
        .flat_map(|r| r.user_claims_list())
        .collect();
    claims.sort();
    claims.dedup();

    let scopes = identity
        .into_iter()
        .map(|r| r.name)
        .chain(api.into_iter().map(|s| s.name))
        .collect();

    Ok(OpenIdConfiguration {
        issuer: state.issuer.clone(),
        jwks_uri: state.endpoint(JWKS_PATH),
        token_endpoint: state.endpoint(TOKEN_PATH),
        grant_types_supported: vec!["client_credentials".to_string()],
        scopes_supported: scopes,
        claims_supported: claims,
        token_endpoint_auth_methods_supported: vec![
            "client_secret_basic".to_string(),
            "client_secret_post".to_string(),
        ],
        id_token_signing_alg_values_supported: vec!["EdDSA".to_string()],
        subject_types_supported: vec!["public".to_string()],
    })
}

/// JSON Web Key Set with the public half of the signing credential.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration/jwks",
    tag = ENGINE_TAG,
    operation_id = "JSON Web Key Set",
    summary = "Public signing keys",
    description = "Returns the keys resource servers use to verify access tokens.",
    responses(
        (status = 200, description = "JWK set", content_type = "application/json"),
    )
)]
pub async fn jwks(State(state): State<EngineState>) -> Response {
    (StatusCode::OK, Json(state.credential.jwks())).into_response()
}
