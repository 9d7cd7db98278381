//! Request pipeline assembly.
//!
//! A pipeline is given as an explicit ordered list of stages:
//! CORS, authentication, authorization, routing. Each must appear exactly
//! once and in that order. The assembled router runs them outermost first,
//! wrapped in an HTTP trace layer.

pub mod auth;
pub mod cors;

pub use auth::{AuthError, Authentication, AuthorizationPolicy, Requirement};
pub use cors::CorsPolicy;

use axum::{Router, middleware};
use std::fmt;
use thiserror::Error;
use tower_http::trace::TraceLayer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageKind {
    Cors,
    Authentication,
    Authorization,
    Routing,
}

impl StageKind {
    pub const ORDER: [StageKind; 4] = [
        StageKind::Cors,
        StageKind::Authentication,
        StageKind::Authorization,
        StageKind::Routing,
    ];
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Cors => "cors",
            StageKind::Authentication => "authentication",
            StageKind::Authorization => "authorization",
            StageKind::Routing => "routing",
        };
        f.write_str(name)
    }
}

pub enum Stage {
    Cors(CorsPolicy),
    Authentication(Authentication),
    Authorization(AuthorizationPolicy),
    Routing(Router),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Cors(_) => StageKind::Cors,
            Stage::Authentication(_) => StageKind::Authentication,
            Stage::Authorization(_) => StageKind::Authorization,
            Stage::Routing(_) => StageKind::Routing,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pipeline is missing the {0} stage")]
    Missing(StageKind),
    #[error("pipeline has more than one {0} stage")]
    Duplicate(StageKind),
    #[error("{stage} stage must not come after {after}")]
    OutOfOrder { stage: StageKind, after: StageKind },
}

/// Check the stage order and build the router.
pub fn assemble(stages: Vec<Stage>) -> Result<Router, PipelineError> {
    let mut cors = None;
    let mut authentication = None;
    let mut authorization = None;
    let mut routing = None;
    let mut last: Option<StageKind> = None;

    for stage in stages {
        let kind = stage.kind();
        let already = match kind {
            StageKind::Cors => cors.is_some(),
            StageKind::Authentication => authentication.is_some(),
            StageKind::Authorization => authorization.is_some(),
            StageKind::Routing => routing.is_some(),
        };
        if already {
            return Err(PipelineError::Duplicate(kind));
        }
        if let Some(after) = last
            && kind < after
        {
            return Err(PipelineError::OutOfOrder { stage: kind, after });
        }
        last = Some(kind);

        match stage {
            Stage::Cors(policy) => cors = Some(policy),
            Stage::Authentication(authn) => authentication = Some(authn),
            Stage::Authorization(policy) => authorization = Some(policy),
            Stage::Routing(router) => routing = Some(router),
        }
    }

    let cors = cors.ok_or(PipelineError::Missing(StageKind::Cors))?;
    let authentication =
        authentication.ok_or(PipelineError::Missing(StageKind::Authentication))?;
    let authorization = authorization.ok_or(PipelineError::Missing(StageKind::Authorization))?;
    let routing = routing.ok_or(PipelineError::Missing(StageKind::Routing))?;

    tracing::debug!(origins = ?cors, requirement = ?authorization.requirement, "assembled request pipeline");

    // The last layer added runs first.
    Ok(routing
        .layer(middleware::from_fn_with_state(
            authorization,
            auth::authorize,
        ))
        .layer(middleware::from_fn_with_state(
            authentication,
            auth::authenticate,
        ))
        .layer(cors.layer())
        .layer(middleware::from_fn_with_state(
            cors,
            cors::reject_disallowed_origin,
        ))
        .layer(TraceLayer::new_for_http()))
}
