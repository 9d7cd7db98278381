use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
    #[error("Missing configuration section: {0}")]
    MissingSection(&'static str),
}

/// Which kind of key material the engine signs tokens with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningCredentialType {
    /// Generated per process. Tokens do not survive a restart.
    #[default]
    Development,
    /// Loaded from the certificate store. Required for production.
    Certificate,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SigningCredentialConfig {
    #[serde(default)]
    pub signing_credential_type: SigningCredentialType,
    #[serde(default)]
    pub cert_name: Option<String>,
    #[serde(default)]
    pub cert_password: Option<String>,
    #[serde(default = "default_cert_store_path")]
    pub cert_store_path: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CorsConfig {
    /// Explicit origin allow-list. `*` admits any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Origins with trailing slashes removed, the form browsers send.
    pub fn normalized_origins(&self) -> Vec<String> {
        self.allowed_origins
            .iter()
            .map(|o| normalize_origin(o))
            .filter(|o| !o.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResourceApiConfig {
    #[serde(default = "default_resource_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Base URL of the authorization server issuing the tokens.
    pub authority: String,
    /// Audience expected in access tokens (the API resource name).
    pub api_name: String,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    pub issuer_url: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,
    /// Interval of the expired-grant cleanup task in seconds
    #[serde(default = "default_token_cleanup_interval")]
    pub token_cleanup_interval_secs: u64,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub signing_credential: SigningCredentialConfig,
}

/// The part of the configuration file the resource API reads. Everything
/// else in the file is ignored.
#[derive(Deserialize)]
struct ResourceApiFile {
    #[serde(default)]
    resource_api: Option<ResourceApiConfig>,
}

pub fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5001))
}

fn default_resource_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5002))
}

fn default_access_token_lifetime() -> i64 {
    3600
}

fn default_token_cleanup_interval() -> u64 {
    3600
}

fn default_cert_store_path() -> PathBuf {
    PathBuf::from("certs")
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching a key path separated by double underscores
/// (e.g. `SIGNING_CREDENTIAL__CERT_NAME`) overrides the file value.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from("config.yaml")
}

pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let app: AppConfig = build(path)?.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Load only the `resource_api` section, with the same file and environment
/// layering as [`load_config`].
pub fn load_resource_api_config() -> Result<ResourceApiConfig, ConfigError> {
    load_resource_api_config_from("config.yaml")
}

pub fn load_resource_api_config_from(path: &str) -> Result<ResourceApiConfig, ConfigError> {
    let file: ResourceApiFile = build(path)?.try_deserialize()?;
    let api = file
        .resource_api
        .ok_or(ConfigError::MissingSection("resource_api"))?;
    validate_resource_api(&api)?;
    Ok(api)
}

fn build(path: &str) -> Result<config::Config, ConfigError> {
    use config::{Config, Environment, File};
    Ok(Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::default().separator("__"))
        .build()?)
}

pub fn validate(app: &AppConfig) -> Result<(), ConfigError> {
    if app.issuer_url.trim().is_empty() {
        return Err(ConfigError::Validation("issuer_url must not be empty".into()));
    }
    if app.access_token_lifetime <= 0 {
        return Err(ConfigError::Validation(
            "access_token_lifetime must be > 0".into(),
        ));
    }
    if app.token_cleanup_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "token_cleanup_interval_secs must be > 0".into(),
        ));
    }
    if app.signing_credential.signing_credential_type == SigningCredentialType::Certificate
        && app
            .signing_credential
            .cert_name
            .as_deref()
            .is_none_or(|n| n.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "signing_credential.cert_name is required for certificate credentials".into(),
        ));
    }
    Ok(())
}

pub fn validate_resource_api(api: &ResourceApiConfig) -> Result<(), ConfigError> {
    if api.api_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "resource_api.api_name must not be empty".into(),
        ));
    }
    if !api.authority.starts_with("http://") && !api.authority.starts_with("https://") {
        return Err(ConfigError::Validation(
            "resource_api.authority must be an http(s) URL".into(),
        ));
    }
    Ok(())
}
