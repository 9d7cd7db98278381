//! Cross-origin policy.
//!
//! Requests carrying an `Origin` that is not on the allow-list are refused
//! with 403 before any later stage runs. Allowed origins get the usual CORS
//! headers, with any method and any header permitted.

use crate::config::normalize_origin;
use crate::pipeline::AuthError;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::ORIGIN},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct CorsPolicy {
    allow_any: bool,
    origins: Arc<BTreeSet<String>>,
}

impl CorsPolicy {
    /// Build a policy from an origin list. `*` admits every origin.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allow_any = false;
        let mut set = BTreeSet::new();
        for origin in origins {
            let origin = normalize_origin(origin.as_ref());
            if origin == "*" {
                allow_any = true;
            } else if origin.is_empty() {
                continue;
            } else if HeaderValue::from_str(&origin).is_err() {
                warn!(%origin, "ignoring origin that is not a valid header value");
            } else {
                set.insert(origin);
            }
        }
        if allow_any {
            warn!("CORS allows any origin; restrict cors.allowed_origins outside development");
        }
        Self {
            allow_any,
            origins: Arc::new(set),
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allow_any || self.origins.contains(&normalize_origin(origin))
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    pub(crate) fn layer(&self) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if self.allow_any {
            return layer.allow_origin(Any);
        }
        let origins: Vec<HeaderValue> = self
            .origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub(crate) async fn reject_disallowed_origin(
    State(policy): State<CorsPolicy>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let allowed = origin.to_str().is_ok_and(|o| policy.allows(o));
        if !allowed {
            debug!(origin = ?origin, path = %req.uri().path(), "rejected cross-origin request");
            return AuthError::forbidden("origin is not allowed").into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_normalized_origins() {
        let policy = CorsPolicy::new(["https://app.test/", "http://localhost:5003"]);
        assert!(policy.allows("https://app.test"));
        assert!(policy.allows("http://localhost:5003/"));
        assert!(!policy.allows("https://evil.test"));
        assert_eq!(policy.origins().count(), 2);
    }

    #[test]
    fn wildcard_allows_everything() {
        let policy = CorsPolicy::new(["*"]);
        assert!(policy.allows("https://anything.test"));
    }

    #[test]
    fn empty_list_allows_nothing() {
        let policy = CorsPolicy::new(Vec::<String>::new());
        assert!(!policy.allows("https://app.test"));
    }
}
