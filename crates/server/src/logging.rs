//! Tracing subscriber setup shared by both binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const AUTHORITY_DIRECTIVES: &str = "oidc_authority=info,tower_http=info,sea_orm=info";
pub const RESOURCE_API_DIRECTIVES: &str = "oidc_authority=info,resource_api=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides the default directives.
pub fn initialize_standard_tracing(default_directives: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}
