use oidc_authority::bootstrap;
use oidc_authority::config::load_config;
use oidc_authority::engine::cleanup::spawn_cleanup_task;
use oidc_authority::logging::{AUTHORITY_DIRECTIVES, initialize_standard_tracing};
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use std::time::Duration;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    initialize_standard_tracing(AUTHORITY_DIRECTIVES);

    CryptoProvider::install_default(crypto::ring::default_provider())
        .map_err(|_| color_eyre::eyre::eyre!("Failed to install rustls crypto provider"))?;

    let config = load_config()?;
    let listen_addr = config.listen_addr;

    let authority = bootstrap::authorization_server(config).await?;

    spawn_cleanup_task(
        authority.resources.db.clone(),
        Duration::from_secs(authority.resources.config.token_cleanup_interval_secs),
    );

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "Server running");
    axum::serve(
        listener,
        authority
            .router
            .into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
