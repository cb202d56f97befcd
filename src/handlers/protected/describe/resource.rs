use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::RequestScope;
use crate::state::AppState;

/// GET /api/describe - names of every registered resource
pub async fn list(State(state): State<AppState>, _scope: RequestScope) -> ApiResponse<Value> {
    let resources: Vec<Value> = state
        .registry
        .iter()
        .map(|schema| {
            json!({
                "name": schema.name,
                "fields": schema.fields.len(),
                "status_field": schema.status_field,
            })
        })
        .collect();

    ApiResponse::success(json!({ "resources": resources }))
}

/// GET /api/describe/:resource - field definitions of one resource
pub async fn get(
    State(state): State<AppState>,
    _scope: RequestScope,
    Path(resource): Path<String>,
) -> ApiResult<Value> {
    let schema = state.resource(&resource)?;
    Ok(ApiResponse::success(schema.describe()))
}
