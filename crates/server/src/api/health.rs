//! Health check endpoint.

/// Tag for OpenAPI documentation.
pub const MISC_TAG: &str = "Miscellaneous";

/// Health check endpoint.
///
/// Only reachable once bootstrap has finished, so a 200 also means the
/// stores are migrated and seeded.
#[tracing::instrument()]
#[utoipa::path(
    method(get, head),
    path = "/healthz",
    tag = MISC_TAG,
    operation_id = "Health Check",
    summary = "Service health check",
    description = "Returns `ok` once the process has completed its bootstrap and serves requests.\n\n\
                   Reachable without a token. Supports both GET and HEAD for load balancer and \
                   orchestrator probes.",
    responses(
        (status = 200, description = "Service is ready", body = str, content_type = "text/plain", example = "ok")
    )
)]
pub async fn health() -> &'static str {
    "ok"
}
