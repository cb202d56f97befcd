use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::resource::{Record, WriteMode};
use crate::scope::RequestScope;
use crate::state::AppState;

use super::utils::{parse_record_id, record_not_found, validated_body};

/// GET /api/data/:resource/:id - fetch one record
pub async fn get(
    State(state): State<AppState>,
    scope: RequestScope,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Record> {
    let schema = state.resource(&resource)?;
    let id = parse_record_id(&id)?;

    state
        .store
        .get(schema, scope.effective_user_id, id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| record_not_found(schema.name, id))
}

/// PUT /api/data/:resource/:id - replace every writable field
pub async fn put(
    State(state): State<AppState>,
    scope: RequestScope,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    write(state, scope, resource, id, body, WriteMode::Replace).await
}

/// PATCH /api/data/:resource/:id - update only the supplied fields
pub async fn patch(
    State(state): State<AppState>,
    scope: RequestScope,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    write(state, scope, resource, id, body, WriteMode::Patch).await
}

async fn write(
    state: AppState,
    scope: RequestScope,
    resource: String,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Record> {
    let schema = state.resource(&resource)?;
    let id = parse_record_id(&id)?;
    let changes = validated_body(schema, body, mode)?;

    let updated = state
        .store
        .update(schema, scope.effective_user_id, id, changes)
        .await?
        .ok_or_else(|| record_not_found(schema.name, id))?;

    tracing::info!("Updated {} {} ({:?}) for {}", schema.name, id, mode, scope.effective_user_id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/data/:resource/:id
pub async fn delete(
    State(state): State<AppState>,
    scope: RequestScope,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let schema = state.resource(&resource)?;
    let id = parse_record_id(&id)?;

    if !state.store.delete(schema, scope.effective_user_id, id).await? {
        return Err(record_not_found(schema.name, id));
    }

    tracing::info!("Deleted {} {} for {}", schema.name, id, scope.effective_user_id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
