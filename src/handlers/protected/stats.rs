use std::collections::BTreeMap;

use axum::extract::{Path, State};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::RequestScope;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResourceStats {
    pub resource: &'static str,
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

/// GET /api/stats/:resource - record count per status for the caller
pub async fn get(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(resource): Path<String>,
) -> ApiResult<ResourceStats> {
    let schema = state.resource(&resource)?;
    let status = schema
        .status_field
        .ok_or_else(|| ApiError::bad_request(format!("Resource '{}' has no status field", schema.name)))?;

    let counts = state.store.count_by(schema, scope.effective_user_id, status).await?;

    Ok(ApiResponse::success(ResourceStats {
        resource: schema.name,
        total: counts.iter().map(|c| c.count).sum(),
        by_status: counts.into_iter().map(|c| (c.value, c.count)).collect(),
    }))
}
