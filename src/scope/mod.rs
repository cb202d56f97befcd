//! Request scoping: decides which owner id filters every query of a request.
//!
//! [`RequestScope`] is an extractor. Handlers that take it never run for an
//! unauthenticated, non-demo request, so the store is never reached.

pub mod identity;
pub mod selector;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{resolve_session, SessionLookup};
use crate::state::AppState;

pub use identity::{detect_demo, DemoSource};
pub use selector::select_scope;

/// Where the effective owner id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "via", rename_all = "snake_case")]
pub enum ScopeSource {
    Demo(DemoSource),
    Session,
}

/// The owner every data operation of this request is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestScope {
    pub is_demo: bool,
    pub effective_user_id: Uuid,
    pub source: ScopeSource,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Unauthorized")]
    MissingSession,

    #[error("Unauthorized: {0}")]
    InvalidSession(String),
}

#[async_trait]
impl FromRequestParts<AppState> for RequestScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let demo = detect_demo(parts.uri.query(), &parts.headers);

        let lookup = match parts.extensions.get::<SessionLookup>() {
            Some(lookup) => lookup.clone(),
            None => resolve_session(&parts.headers, &state.config.security),
        };

        match select_scope(demo, &lookup, &state.config.demo) {
            Ok(scope) => {
                tracing::debug!(
                    "Request scope resolved: owner={} demo={} source={:?}",
                    scope.effective_user_id,
                    scope.is_demo,
                    scope.source
                );
                parts.extensions.insert(scope.clone());
                Ok(scope)
            }
            Err(e) => {
                tracing::warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
                Err(e.into())
            }
        }
    }
}
