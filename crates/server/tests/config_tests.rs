use config::Config;
use oidc_authority::config::{
    AppConfig, ConfigError, SigningCredentialConfig, SigningCredentialType, load_config_from,
    load_resource_api_config_from,
};
use std::env;
use std::fs;

#[test]
fn test_signing_credential_deserialization() {
    let yaml_content = r#"
signing_credential_type: "certificate"
cert_name: "idsrv"
cert_password: "changeit"
cert_store_path: "/etc/authority/certs"
"#;

    let config = Config::builder()
        .add_source(config::File::from_str(
            yaml_content,
            config::FileFormat::Yaml,
        ))
        .build()
        .expect("Failed to build config");

    let credential: SigningCredentialConfig = config
        .try_deserialize()
        .expect("Failed to deserialize signing credential config");
    assert_eq!(
        credential.signing_credential_type,
        SigningCredentialType::Certificate
    );
    assert_eq!(credential.cert_name.as_deref(), Some("idsrv"));
    assert_eq!(credential.cert_password.as_deref(), Some("changeit"));
    assert_eq!(
        credential.cert_store_path,
        std::path::PathBuf::from("/etc/authority/certs")
    );
}

#[test]
fn test_app_config_deserialization_with_defaults() {
    let yaml_content = r#"
database_url: "postgres://localhost/authority"
issuer_url: "https://localhost:5001"
"#;

    let config = Config::builder()
        .add_source(config::File::from_str(
            yaml_content,
            config::FileFormat::Yaml,
        ))
        .build()
        .expect("Failed to build config");

    let app_config: AppConfig = config
        .try_deserialize()
        .expect("Failed to deserialize app config");
    assert_eq!(app_config.database_url, "postgres://localhost/authority");
    assert_eq!(app_config.listen_addr.port(), 5001);
    assert_eq!(app_config.access_token_lifetime, 3600);
    assert_eq!(
        app_config.signing_credential.signing_credential_type,
        SigningCredentialType::Development
    );
    assert!(app_config.cors.allowed_origins.is_empty());
}

#[test]
fn test_resource_api_config_needs_only_its_section() {
    let config_path = env::temp_dir().join(format!("resource-api-{}.yaml", uuid::Uuid::new_v4()));
    fs::write(
        &config_path,
        r#"
resource_api:
  listen_addr: "127.0.0.1:6001"
  authority: "https://localhost:5001"
  api_name: "api1"
  cors:
    allowed_origins:
      - "https://localhost:5003/"
"#,
    )
    .expect("Failed to write temp config");

    let result = load_resource_api_config_from(config_path.to_str().unwrap());
    let _ = fs::remove_file(&config_path);

    let api = result.expect("resource api config without authority settings");
    assert_eq!(api.listen_addr.port(), 6001);
    assert_eq!(api.authority, "https://localhost:5001");
    assert_eq!(api.api_name, "api1");
    assert_eq!(
        api.cors.normalized_origins(),
        vec!["https://localhost:5003"]
    );
}

#[test]
fn test_resource_api_config_missing_section() {
    let config_path = env::temp_dir().join(format!("resource-api-{}.yaml", uuid::Uuid::new_v4()));
    fs::write(
        &config_path,
        r#"
database_url: "sqlite::memory:"
issuer_url: "https://localhost:5001"
"#,
    )
    .expect("Failed to write temp config");

    let result = load_resource_api_config_from(config_path.to_str().unwrap());
    let _ = fs::remove_file(&config_path);
    assert!(matches!(
        result,
        Err(ConfigError::MissingSection("resource_api"))
    ));
}

#[test]
fn test_load_config_with_environment_override() {
    let config_path = env::temp_dir().join(format!("authority-{}.yaml", uuid::Uuid::new_v4()));
    let config_content = r#"
database_url: "sqlite::memory:"
issuer_url: "https://file.example.com"
signing_credential:
  signing_credential_type: "certificate"
  cert_name: "from-file"
"#;
    fs::write(&config_path, config_content).expect("Failed to write temp config");

    unsafe {
        env::set_var("SIGNING_CREDENTIAL__CERT_NAME", "from-env");
    }
    let result = load_config_from(config_path.to_str().unwrap());
    unsafe {
        env::remove_var("SIGNING_CREDENTIAL__CERT_NAME");
    }
    let _ = fs::remove_file(&config_path);

    let app_config = result.expect("load config");
    assert_eq!(
        app_config.signing_credential.cert_name.as_deref(),
        Some("from-env")
    );
}

#[test]
fn test_load_config_rejects_invalid_values() {
    let config_path = env::temp_dir().join(format!("authority-{}.yaml", uuid::Uuid::new_v4()));
    fs::write(
        &config_path,
        r#"
database_url: "sqlite::memory:"
issuer_url: "https://localhost:5001"
access_token_lifetime: 0
"#,
    )
    .expect("Failed to write temp config");

    let result = load_config_from(config_path.to_str().unwrap());
    let _ = fs::remove_file(&config_path);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_load_config_missing_file() {
    let missing = env::temp_dir().join(format!("absent-{}.yaml", uuid::Uuid::new_v4()));
    let result = load_config_from(missing.to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Build(_))));
}
