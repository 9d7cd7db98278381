//! Catalog entries mapped to their store representation.

use crate::catalog;
use crate::entity::{api_resource, api_scope, client, identity_resource};
use sea_orm::ActiveValue::{NotSet, Set};
use time::OffsetDateTime;

fn spaced(values: &[String]) -> String {
    values.join(" ")
}

fn json(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

impl From<&catalog::IdentityResource> for identity_resource::ActiveModel {
    fn from(resource: &catalog::IdentityResource) -> Self {
        identity_resource::ActiveModel {
            id: NotSet,
            name: Set(resource.name.clone()),
            display_name: Set(resource.display_name.clone()),
            user_claims: Set(spaced(&resource.user_claims)),
            enabled: Set(true),
            show_in_discovery_document: Set(true),
            created_at: Set(OffsetDateTime::now_utc()),
        }
    }
}

impl From<&catalog::ApiScope> for api_scope::ActiveModel {
    fn from(scope: &catalog::ApiScope) -> Self {
        api_scope::ActiveModel {
            id: NotSet,
            name: Set(scope.name.clone()),
            display_name: Set(scope.display_name.clone()),
            enabled: Set(true),
            show_in_discovery_document: Set(true),
        }
    }
}

impl From<&catalog::ApiResource> for api_resource::ActiveModel {
    fn from(resource: &catalog::ApiResource) -> Self {
        api_resource::ActiveModel {
            id: NotSet,
            name: Set(resource.name.clone()),
            display_name: Set(resource.display_name.clone()),
            user_claims: Set(spaced(&resource.user_claims)),
            scopes: Set(spaced(&resource.scopes)),
            enabled: Set(true),
            created_at: Set(OffsetDateTime::now_utc()),
        }
    }
}

impl From<&catalog::Client> for client::ActiveModel {
    fn from(c: &catalog::Client) -> Self {
        let grant_types: Vec<String> = c
            .allowed_grant_types
            .iter()
            .map(|g| g.as_str().to_string())
            .collect();
        client::ActiveModel {
            client_id: Set(c.client_id.clone()),
            client_name: Set(c.client_name.clone()),
            client_secrets: Set(json(&c.client_secrets)),
            require_client_secret: Set(c.require_client_secret),
            allowed_grant_types: Set(spaced(&grant_types)),
            redirect_uris: Set(json(&c.redirect_uris)),
            post_logout_redirect_uris: Set(json(&c.post_logout_redirect_uris)),
            allowed_cors_origins: Set(json(&c.allowed_cors_origins)),
            allowed_scopes: Set(spaced(&c.allowed_scopes)),
            require_pkce: Set(c.require_pkce),
            refresh_token_usage: Set(c.refresh_token_usage.as_str().to_string()),
            enabled: Set(true),
            created_at: Set(OffsetDateTime::now_utc()),
        }
    }
}
