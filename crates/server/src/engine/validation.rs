//! Bearer token validation.
//!
//! The authorization server validates against its own signing credential.
//! A resource API validates against the key set published by its authority,
//! fetched on first use and re-fetched when a token names an unknown key, at
//! most once per [`KEY_REFRESH_COOLDOWN`].

use crate::credential::SigningCredential;
use crate::engine::{AccessTokenClaims, JWKS_PATH};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::Request;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time between two key set fetches. Unknown key ids seen within
/// this window are rejected from the cache.
pub const KEY_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("no signing key with id '{0}'")]
    UnknownKey(String),
    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("failed to fetch key set: {0}")]
    KeySet(String),
}

/// The authenticated caller of a request.
#[derive(Clone, Debug)]
pub struct Principal {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub claims: AccessTokenClaims,
}

impl Principal {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Flattened `(type, value)` pairs, one per claim value.
    pub fn claim_pairs(&self) -> Vec<(String, String)> {
        let c = &self.claims;
        let mut pairs = vec![("iss".to_string(), c.iss.clone())];
        pairs.extend(c.aud.iter().map(|a| ("aud".to_string(), a.clone())));
        pairs.push(("client_id".to_string(), c.client_id.clone()));
        pairs.extend(c.scope.iter().map(|s| ("scope".to_string(), s.clone())));
        pairs.push(("exp".to_string(), c.exp.to_string()));
        pairs.push(("iat".to_string(), c.iat.to_string()));
        pairs.push(("nbf".to_string(), c.nbf.to_string()));
        pairs.push(("jti".to_string(), c.jti.clone()));
        pairs
    }
}

/// Turns a bearer token into a [`Principal`].
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Principal, TokenError>;
}

enum KeySource {
    Local { kid: String, key: DecodingKey },
    Remote(RemoteKeySet),
}

struct RemoteKeySet {
    url: String,
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    cached: RwLock<CachedKeys>,
}

#[derive(Default)]
struct CachedKeys {
    set: Option<JwkSet>,
    last_fetch: Option<Instant>,
}

impl CachedKeys {
    fn find(&self, kid: &str) -> Option<Result<DecodingKey, TokenError>> {
        let jwk = self.set.as_ref()?.find(kid)?;
        Some(DecodingKey::from_jwk(jwk).map_err(TokenError::from))
    }

    fn recently_fetched(&self) -> bool {
        self.last_fetch
            .is_some_and(|at| at.elapsed() < KEY_REFRESH_COOLDOWN)
    }
}

impl RemoteKeySet {
    async fn fetch(&self) -> Result<JwkSet, TokenError> {
        let req = Request::builder()
            .uri(&self.url)
            .header(hyper::header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| TokenError::KeySet(e.to_string()))?;

        let response = tokio::time::timeout(FETCH_TIMEOUT, self.client.request(req))
            .await
            .map_err(|_| TokenError::KeySet(format!("timeout after {FETCH_TIMEOUT:?}")))?
            .map_err(|e| TokenError::KeySet(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenError::KeySet(format!("HTTP {}", response.status())));
        }
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TokenError::KeySet(e.to_string()))?
            .to_bytes();
        serde_json::from_slice(&body).map_err(|e| TokenError::KeySet(e.to_string()))
    }

    async fn key(&self, kid: &str) -> Result<DecodingKey, TokenError> {
        if let Some(key) = self.cached.read().await.find(kid) {
            return key;
        }

        // Concurrent misses queue on the write lock and share one fetch.
        let mut cached = self.cached.write().await;
        if let Some(key) = cached.find(kid) {
            return key;
        }
        if cached.recently_fetched() {
            debug!(kid, "unknown key id within refresh cooldown");
            return Err(TokenError::UnknownKey(kid.to_string()));
        }

        cached.last_fetch = Some(Instant::now());
        let set = self.fetch().await?;
        info!(url = %self.url, keys = set.keys.len(), "refreshed signing keys");
        cached.set = Some(set);
        cached
            .find(kid)
            .unwrap_or_else(|| Err(TokenError::UnknownKey(kid.to_string())))
    }
}

pub struct JwtValidator {
    issuer: String,
    audience: Option<String>,
    keys: KeySource,
}

impl JwtValidator {
    /// Validate tokens signed by `credential`. Without an audience any
    /// audience is accepted.
    pub fn local(credential: &SigningCredential, issuer: &str, audience: Option<&str>) -> Self {
        Self {
            issuer: issuer.trim_end_matches('/').to_string(),
            audience: audience.map(String::from),
            keys: KeySource::Local {
                kid: credential.kid().to_string(),
                key: credential.decoding_key(),
            },
        }
    }

    /// Validate tokens issued by `authority` for the `audience` API, using
    /// the authority's published key set.
    pub fn remote(authority: &str, audience: &str) -> Result<Self, TokenError> {
        let authority = authority.trim_end_matches('/').to_string();
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(|e| TokenError::KeySet(e.to_string()))?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            keys: KeySource::Remote(RemoteKeySet {
                url: format!("{authority}{JWKS_PATH}"),
                client,
                cached: RwLock::new(CachedKeys::default()),
            }),
            issuer: authority,
            audience: Some(audience.to_string()),
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation.validate_nbf = true;
        validation
    }
}

#[async_trait]
impl TokenValidator for JwtValidator {
    async fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::EdDSA {
            return Err(TokenError::Malformed(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| TokenError::Malformed("missing kid".to_string()))?;

        let data = match &self.keys {
            KeySource::Local { kid: own, key } => {
                if own != &kid {
                    return Err(TokenError::UnknownKey(kid));
                }
                decode::<AccessTokenClaims>(token, key, &self.validation())?
            }
            KeySource::Remote(remote) => {
                let key = remote.key(&kid).await?;
                decode::<AccessTokenClaims>(token, &key, &self.validation())?
            }
        };

        debug!(client_id = %data.claims.client_id, "token validated");
        Ok(Principal {
            client_id: data.claims.client_id.clone(),
            scopes: data.claims.scope.clone(),
            claims: data.claims,
        })
    }
}
