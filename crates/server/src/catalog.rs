//! Static configuration catalog.
//!
//! The desired end state of the configuration and identity stores, declared
//! in code and changed only by redeploying. Every function here is pure and
//! returns the same entities on every call; the seeder is the only consumer.

use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

pub const OPENID: &str = "openid";
pub const PROFILE: &str = "profile";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityResource {
    pub name: String,
    pub display_name: Option<String>,
    pub user_claims: Vec<String>,
}

impl IdentityResource {
    pub fn new(name: &str, user_claims: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            user_claims: user_claims.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn openid() -> Self {
        Self {
            display_name: Some("Your user identifier".into()),
            ..Self::new(OPENID, &["sub"])
        }
    }

    pub fn profile() -> Self {
        Self {
            display_name: Some("User profile".into()),
            ..Self::new(
                PROFILE,
                &[
                    "name",
                    "family_name",
                    "given_name",
                    "middle_name",
                    "nickname",
                    "preferred_username",
                    "profile",
                    "picture",
                    "website",
                    "gender",
                    "birthdate",
                    "zoneinfo",
                    "locale",
                    "updated_at",
                ],
            )
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiScope {
    pub name: String,
    pub display_name: Option<String>,
}

impl ApiScope {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResource {
    pub name: String,
    pub display_name: Option<String>,
    pub user_claims: Vec<String>,
    /// Names of the API scopes this resource protects.
    pub scopes: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
    ClientCredentials,
    AuthorizationCode,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a refresh token when it is redeemed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenUsage {
    ReUse,
    #[default]
    OneTimeOnly,
}

impl TokenUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenUsage::ReUse => "ReUse",
            TokenUsage::OneTimeOnly => "OneTimeOnly",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    pub client_id: String,
    pub client_name: Option<String>,
    /// SHA-256 hashes of the client secrets, base64 encoded.
    pub client_secrets: Vec<String>,
    pub require_client_secret: bool,
    pub allowed_grant_types: Vec<GrantType>,
    pub redirect_uris: Vec<String>,
    pub post_logout_redirect_uris: Vec<String>,
    pub allowed_cors_origins: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub require_pkce: bool,
    pub refresh_token_usage: TokenUsage,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_name: None,
            client_secrets: Vec::new(),
            require_client_secret: true,
            allowed_grant_types: Vec::new(),
            redirect_uris: Vec::new(),
            post_logout_redirect_uris: Vec::new(),
            allowed_cors_origins: Vec::new(),
            allowed_scopes: Vec::new(),
            require_pkce: true,
            refresh_token_usage: TokenUsage::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    /// Explicit id, or `None` to let the store assign one.
    pub id: Option<i32>,
    pub name: String,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }

    pub fn with_id(id: i32, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
        }
    }
}

/// Hash a client secret the way stored secrets are compared: SHA-256, base64.
pub fn hash_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

pub fn identity_resources() -> Vec<IdentityResource> {
    vec![
        IdentityResource::openid(),
        IdentityResource::profile(),
        IdentityResource::new("claims", &["given_name"]),
    ]
}

pub fn api_scopes() -> Vec<ApiScope> {
    vec![ApiScope::new("api1")]
}

pub fn api_resources() -> Vec<ApiResource> {
    vec![ApiResource {
        name: "api1".into(),
        scopes: vec!["api1".into()],
        ..Default::default()
    }]
}

pub fn clients() -> Vec<Client> {
    vec![
        // machine to machine client
        Client {
            client_id: "client".into(),
            client_secrets: vec![hash_secret("secret")],
            allowed_grant_types: vec![GrantType::ClientCredentials],
            allowed_scopes: vec!["api1".into()],
            ..Default::default()
        },
        // interactive server-side web client
        Client {
            client_id: "mvc".into(),
            client_secrets: vec![hash_secret("secret")],
            allowed_grant_types: vec![GrantType::AuthorizationCode],
            require_pkce: true,
            refresh_token_usage: TokenUsage::ReUse,
            redirect_uris: vec!["https://localhost:5002/signin-oidc".into()],
            post_logout_redirect_uris: vec!["https://localhost:5002/signout-callback-oidc".into()],
            allowed_scopes: vec![OPENID.into(), PROFILE.into(), "claims".into()],
            ..Default::default()
        },
        Client {
            client_id: "js".into(),
            client_name: Some("JavaScript Client".into()),
            allowed_grant_types: vec![GrantType::AuthorizationCode],
            require_client_secret: false,
            redirect_uris: vec!["https://localhost:5003/callback.html".into()],
            post_logout_redirect_uris: vec!["https://localhost:5003/index.html".into()],
            allowed_cors_origins: vec!["https://localhost:5003".into()],
            allowed_scopes: vec![OPENID.into(), PROFILE.into(), "api1".into()],
            ..Default::default()
        },
        Client {
            client_id: "spa".into(),
            client_name: Some("Spa Client".into()),
            allowed_grant_types: vec![GrantType::AuthorizationCode],
            require_client_secret: false,
            redirect_uris: vec![
                "https://localhost:5005/callback".into(),
                "https://localhost:5005/silent_renew.html".into(),
            ],
            post_logout_redirect_uris: vec!["https://localhost:5005/".into()],
            allowed_cors_origins: vec!["https://localhost:5005".into()],
            allowed_scopes: vec![OPENID.into(), PROFILE.into(), "api1".into()],
            ..Default::default()
        },
    ]
}

pub fn roles() -> Vec<Role> {
    vec![
        Role::new("Admin"),
        Role::with_id(12, "Vendor"),
        Role::with_id(13, "Buyer"),
        Role::with_id(14, "Processing"),
    ]
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("client '{client_id}' allows unknown scope '{scope}'")]
    UnknownClientScope { client_id: String, scope: String },
    #[error("API resource '{resource}' protects unknown scope '{scope}'")]
    UnknownResourceScope { resource: String, scope: String },
    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },
}

/// Every category of the catalog, bundled for seeding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub identity_resources: Vec<IdentityResource>,
    pub api_scopes: Vec<ApiScope>,
    pub api_resources: Vec<ApiResource>,
    pub clients: Vec<Client>,
    pub roles: Vec<Role>,
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            identity_resources: identity_resources(),
            api_scopes: api_scopes(),
            api_resources: api_resources(),
            clients: clients(),
            roles: roles(),
        }
    }

    /// Check unique keys and that every scope reference resolves.
    ///
    /// Resource scopes must name an API scope; client scopes may name either
    /// an API scope or an identity resource.
    pub fn validate(&self) -> Result<(), CatalogError> {
        unique("identity resource", self.identity_resources.iter().map(|r| &r.name))?;
        unique("API scope", self.api_scopes.iter().map(|s| &s.name))?;
        unique("API resource", self.api_resources.iter().map(|r| &r.name))?;
        unique("client", self.clients.iter().map(|c| &c.client_id))?;
        unique(
            "role",
            self.roles.iter().map(|r| r.name.to_uppercase()).collect::<Vec<_>>().iter(),
        )?;

        let api_scopes: HashSet<&str> = self.api_scopes.iter().map(|s| s.name.as_str()).collect();
        let identity: HashSet<&str> = self
            .identity_resources
            .iter()
            .map(|r| r.name.as_str())
            .collect();

        for resource in &self.api_resources {
            if let Some(scope) = resource
                .scopes
                .iter()
                .find(|s| !api_scopes.contains(s.as_str()))
            {
                return Err(CatalogError::UnknownResourceScope {
                    resource: resource.name.clone(),
                    scope: scope.clone(),
                });
            }
        }

        for client in &self.clients {
            if let Some(scope) = client
                .allowed_scopes
                .iter()
                .find(|s| !api_scopes.contains(s.as_str()) && !identity.contains(s.as_str()))
            {
                return Err(CatalogError::UnknownClientScope {
                    client_id: client.client_id.clone(),
                    scope: scope.clone(),
                });
            }
        }

        Ok(())
    }
}

fn unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a String>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CatalogError::Duplicate {
                kind,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
