// handlers/public/mod.rs - endpoints reachable without a session or demo flag

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service information
pub async fn root(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "FreeFlow API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Owner-scoped CRUD over the FreeFlow business resources",
        "resources": state.registry.names(),
        "endpoints": {
            "health": "/health (public)",
            "whoami": "/api/auth/whoami (scoped)",
            "describe": "/api/describe[/:resource] (scoped)",
            "data": "/api/data/:resource[/:id] (scoped)",
            "stats": "/api/stats/:resource (scoped)",
        },
        "demo": {
            "enabled": state.config.demo.enabled,
            "query": "?demo=true",
            "cookie": "demo_mode=true",
            "header": "X-Demo-Mode: true",
        }
    }))
}

/// GET /health - store reachability
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "store": backend,
        }))),
        Err(e) => {
            tracing::error!("Health check failed on {} store: {}", backend, e);
            Err(ApiError::service_unavailable(format!("{} store unavailable", backend)))
        }
    }
}
