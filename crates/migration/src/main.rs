use config::Config;
use migration::{ConfigurationMigrator, IdentityMigrator, OperationalMigrator};
use sea_orm_migration::prelude::*;
use std::env;

#[tokio::main]
async fn main() {
    // Try to get DB URL from env first
    if env::var("DATABASE_URL").is_err() {
        // Fallback: load from config.yaml
        let url = Config::builder()
            .add_source(config::File::with_name("config.yaml"))
            .build()
            .and_then(|settings| settings.get_string("database_url"));
        match url {
            Ok(url) => env::set_var("DATABASE_URL", url),
            Err(e) => eprintln!("DATABASE_URL not set and config.yaml unusable: {e}"),
        }
    }

    // All three stores share one database; pick the migrator to drive.
    let store = env::var("MIGRATION_STORE").unwrap_or_else(|_| "configuration".to_string());
    match store.as_str() {
        "identity" => cli::run_cli(IdentityMigrator).await,
        "configuration" => cli::run_cli(ConfigurationMigrator).await,
        "operational" => cli::run_cli(OperationalMigrator).await,
        other => {
            eprintln!(
                "Unknown MIGRATION_STORE '{other}', expected identity, configuration or operational"
            );
            std::process::exit(2);
        }
    }
}
