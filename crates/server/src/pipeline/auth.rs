//! Authentication and authorization stages.

use crate::engine::{Principal, TokenValidator};
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Error type for authentication failures
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthError {
    /// Error code (e.g., "invalid_token", "insufficient_scope")
    pub error: String,
    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl AuthError {
    pub fn invalid_token(description: impl Into<String>) -> Self {
        Self {
            error: "invalid_token".to_string(),
            error_description: Some(description.into()),
        }
    }

    pub fn insufficient_scope(required_scope: &str) -> Self {
        Self {
            error: "insufficient_scope".to_string(),
            error_description: Some(format!("Token requires '{}' scope", required_scope)),
        }
    }

    pub fn forbidden(description: impl Into<String>) -> Self {
        Self {
            error: "forbidden".to_string(),
            error_description: Some(description.into()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "invalid_token" => StatusCode::UNAUTHORIZED,
            "insufficient_scope" | "forbidden" => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Bearer token authentication through the engine's validator.
#[derive(Clone)]
pub struct Authentication {
    validator: Arc<dyn TokenValidator>,
}

impl Authentication {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Every request passes; handlers may still look for a principal.
    AllowAnonymous,
    Authenticated,
    /// Authenticated and holding this scope.
    Scope(String),
}

#[derive(Clone, Debug)]
pub struct AuthorizationPolicy {
    pub requirement: Requirement,
    /// Path prefixes reachable without authentication
    pub anonymous_paths: Vec<String>,
}

impl AuthorizationPolicy {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            anonymous_paths: Vec::new(),
        }
    }

    pub fn allow_anonymous(mut self, path: impl Into<String>) -> Self {
        self.anonymous_paths.push(path.into());
        self
    }

    fn is_anonymous(&self, path: &str) -> bool {
        self.anonymous_paths.iter().any(|p| {
            path == p
                || path
                    .strip_prefix(p.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn check(&self, principal: Option<&Principal>) -> Result<(), AuthError> {
        match (&self.requirement, principal) {
            (Requirement::AllowAnonymous, _) => Ok(()),
            (_, None) => Err(AuthError::invalid_token("authentication required")),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::Scope(scope), Some(p)) if p.has_scope(scope) => Ok(()),
            (Requirement::Scope(scope), Some(_)) => Err(AuthError::insufficient_scope(scope)),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

pub(crate) async fn authenticate(
    State(auth): State<Authentication>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match auth.validator.validate(&token).await {
            Ok(principal) => {
                tracing::debug!(client_id = %principal.client_id, "authenticated request");
                req.extensions_mut().insert(principal);
            }
            Err(e) => {
                tracing::debug!(error = %e, "bearer token rejected");
                return AuthError::invalid_token(e.to_string()).into_response();
            }
        }
    }
    next.run(req).await
}

pub(crate) async fn authorize(
    State(policy): State<AuthorizationPolicy>,
    req: Request,
    next: Next,
) -> Response {
    if !policy.is_anonymous(req.uri().path())
        && let Err(e) = policy.check(req.extensions().get::<Principal>())
    {
        return e.into_response();
    }
    next.run(req).await
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AuthError::invalid_token("authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AccessTokenClaims;

    fn principal(scopes: &[&str]) -> Principal {
        Principal {
            client_id: "client".into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            claims: AccessTokenClaims {
                iss: "https://auth.test".into(),
                aud: vec!["api1".into()],
                client_id: "client".into(),
                scope: scopes.iter().map(|s| s.to_string()).collect(),
                exp: 0,
                iat: 0,
                nbf: 0,
                jti: "j".into(),
            },
        }
    }

    #[test]
    fn scope_requirement() {
        let policy = AuthorizationPolicy::new(Requirement::Scope("api1".into()));
        assert!(policy.check(Some(&principal(&["api1"]))).is_ok());
        let err = policy.check(Some(&principal(&["other"]))).unwrap_err();
        assert_eq!(err.error, "insufficient_scope");
        assert_eq!(policy.check(None).unwrap_err().error, "invalid_token");
    }

    #[test]
    fn anonymous_paths_match_whole_segments() {
        let policy = AuthorizationPolicy::new(Requirement::Authenticated).allow_anonymous("/healthz");
        assert!(policy.is_anonymous("/healthz"));
        assert!(policy.is_anonymous("/healthz/live"));
        assert!(!policy.is_anonymous("/healthzz"));
        assert!(!policy.is_anonymous("/identity"));
    }

    #[test]
    fn bearer_only() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));
    }
}
