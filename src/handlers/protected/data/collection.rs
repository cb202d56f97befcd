use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::resource::{ListQuery, Record, WriteMode};
use crate::scope::RequestScope;
use crate::state::AppState;

use super::utils::validated_body;

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    fn new(query: &ListQuery, total: u64) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            total,
            total_pages: total.div_ceil(u64::from(query.limit.max(1))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub items: Vec<Record>,
    pub pagination: Pagination,
}

/// GET /api/data/:resource - list the caller's records
pub async fn list(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(resource): Path<String>,
    RawQuery(raw): RawQuery,
) -> ApiResult<RecordList> {
    let schema = state.resource(&resource)?;
    let query = ListQuery::parse(schema, raw.as_deref(), &state.config.api)?;

    let page = state.store.list(schema, scope.effective_user_id, &query).await?;
    tracing::debug!(
        "Listed {} of {} {} for {}",
        page.items.len(),
        page.total,
        schema.name,
        scope.effective_user_id
    );

    Ok(ApiResponse::success(RecordList {
        pagination: Pagination::new(&query, page.total),
        items: page.items,
    }))
}

/// POST /api/data/:resource - create a record owned by the caller
pub async fn create(
    State(state): State<AppState>,
    scope: RequestScope,
    Path(resource): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let schema = state.resource(&resource)?;
    let record = validated_body(schema, body, WriteMode::Create)?;

    let created = state.store.insert(schema, scope.effective_user_id, record).await?;
    let id = created.get("id").and_then(serde_json::Value::as_str).unwrap_or_default();
    tracing::info!("Created {} {} for {}", schema.name, id, scope.effective_user_id);

    Ok(ApiResponse::created(created))
}
