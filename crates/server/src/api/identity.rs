//! Protected endpoint of the resource API.

use crate::engine::Principal;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const RESOURCE_TAG: &str = "Resource API";

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimView {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

/// Echo the claims of the caller's access token.
#[tracing::instrument(skip(principal), fields(client_id = %principal.client_id))]
#[utoipa::path(
    get,
    path = "/identity",
    tag = RESOURCE_TAG,
    operation_id = "Identity",
    summary = "Claims of the calling client",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Claims carried by the access token", body = [ClaimView]),
        (status = 401, description = "Missing or invalid access token", body = crate::pipeline::AuthError),
    )
)]
pub async fn identity(principal: Principal) -> Json<Vec<ClaimView>> {
    Json(
        principal
            .claim_pairs()
            .into_iter()
            .map(|(claim_type, value)| ClaimView { claim_type, value })
            .collect(),
    )
}
