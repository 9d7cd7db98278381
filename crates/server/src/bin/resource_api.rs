//! Protected resource API validating tokens issued by the authority.

use oidc_authority::bootstrap;
use oidc_authority::config::load_resource_api_config;
use oidc_authority::logging::{RESOURCE_API_DIRECTIVES, initialize_standard_tracing};
use rustls::crypto;
use rustls::crypto::CryptoProvider;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    initialize_standard_tracing(RESOURCE_API_DIRECTIVES);

    CryptoProvider::install_default(crypto::ring::default_provider())
        .map_err(|_| color_eyre::eyre::eyre!("Failed to install rustls crypto provider"))?;

    let api = load_resource_api_config()?;
    let router = bootstrap::resource_api(&api)?;

    let listener = tokio::net::TcpListener::bind(api.listen_addr).await?;
    tracing::info!(addr = %api.listen_addr, authority = %api.authority, "Resource API running");
    axum::serve(listener, router)
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
