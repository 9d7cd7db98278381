//! Client entity (configuration store).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_id: String,
    pub client_name: Option<String>,
    /// JSON array of SHA-256/base64 secret hashes
    pub client_secrets: String,
    /// Public clients (SPAs, native apps) do not authenticate
    pub require_client_secret: bool,
    /// Space-separated list of allowed grant types
    pub allowed_grant_types: String,
    /// JSON array of allowed redirect URIs
    pub redirect_uris: String,
    /// JSON array of allowed post-logout redirect URIs
    pub post_logout_redirect_uris: String,
    /// JSON array of origins allowed to call the engine from a browser
    pub allowed_cors_origins: String,
    /// Space-separated list of allowed scopes
    pub allowed_scopes: String,
    pub require_pkce: bool,
    /// "ReUse" or "OneTimeOnly"
    pub refresh_token_usage: String,
    pub enabled: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn secret_hashes(&self) -> Vec<String> {
        super::json_list(&self.client_secrets)
    }

    pub fn grant_types_list(&self) -> Vec<String> {
        super::split_list(&self.allowed_grant_types)
    }

    pub fn scopes_list(&self) -> Vec<String> {
        super::split_list(&self.allowed_scopes)
    }

    pub fn redirect_uris_list(&self) -> Vec<String> {
        super::json_list(&self.redirect_uris)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        super::json_list(&self.allowed_cors_origins)
    }

    pub fn is_grant_type_allowed(&self, grant_type: &str) -> bool {
        self.allowed_grant_types
            .split_whitespace()
            .any(|g| g == grant_type)
    }

    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.allowed_scopes.split_whitespace().any(|s| s == scope)
    }

    /// Compare a presented secret against the stored hashes.
    pub fn verify_secret(&self, presented: &str) -> bool {
        let hashed = crate::catalog::hash_secret(presented);
        self.secret_hashes().iter().any(|h| h == &hashed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model {
            client_id: "client".into(),
            client_name: None,
            client_secrets: serde_json::to_string(&[crate::catalog::hash_secret("secret")])
                .unwrap(),
            require_client_secret: true,
            allowed_grant_types: "client_credentials".into(),
            redirect_uris: "[]".into(),
            post_logout_redirect_uris: "[]".into(),
            allowed_cors_origins: r#"["https://localhost:5003"]"#.into(),
            allowed_scopes: "api1 openid".into(),
            require_pkce: true,
            refresh_token_usage: "OneTimeOnly".into(),
            enabled: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn verifies_hashed_secret() {
        let client = model();
        assert!(client.verify_secret("secret"));
        assert!(!client.verify_secret("Secret"));
        assert!(!client.verify_secret(""));
    }

    #[test]
    fn list_columns() {
        let client = model();
        assert!(client.is_grant_type_allowed("client_credentials"));
        assert!(!client.is_grant_type_allowed("authorization_code"));
        assert!(client.is_scope_allowed("api1"));
        assert!(!client.is_scope_allowed("api"));
        assert_eq!(client.cors_origins_list(), vec!["https://localhost:5003"]);
    }

    #[test]
    fn malformed_json_column_is_empty() {
        let mut client = model();
        client.redirect_uris = "not json".into();
        assert!(client.redirect_uris_list().is_empty());
    }
}
