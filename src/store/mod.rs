//! Row storage behind the generic resource handlers.
//!
//! Every operation takes the effective owner id of the request. Rows owned by
//! anyone else are invisible: reads skip them and writes report "not found".

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::resource::schema::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::resource::{ListQuery, Record, ResourceSchema};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One page of rows plus the number of rows matching the query overall
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordPage {
    pub items: Vec<Record>,
    pub total: u64,
}

/// Number of rows per distinct value of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> Result<RecordPage, StoreError>;

    async fn get(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<Option<Record>, StoreError>;

    /// Insert a validated record; system columns are stamped by the store
    async fn insert(&self, schema: &ResourceSchema, owner: Uuid, record: Record) -> Result<Record, StoreError>;

    /// Apply validated changes; `None` when the row does not exist for this owner
    async fn update(
        &self,
        schema: &ResourceSchema,
        owner: Uuid,
        id: Uuid,
        changes: Record,
    ) -> Result<Option<Record>, StoreError>;

    async fn delete(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Row counts grouped by `column`, largest group first
    async fn count_by(&self, schema: &ResourceSchema, owner: Uuid, column: &str) -> Result<Vec<ValueCount>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}

fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Add id, owner and timestamps to a record about to be inserted
pub(crate) fn stamp_new(schema: &ResourceSchema, owner: Uuid, mut record: Record) -> Record {
    let now = now_timestamp();
    record.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
    record.insert(schema.owner_column.to_string(), Value::String(owner.to_string()));
    record.insert(CREATED_AT_FIELD.to_string(), now.clone());
    record.insert(UPDATED_AT_FIELD.to_string(), now);
    record
}

/// Refresh `updated_at` on a change set and strip anything a client must not move
pub(crate) fn stamp_update(schema: &ResourceSchema, mut changes: Record) -> Record {
    changes.retain(|key, _| !schema.is_system_field(key));
    changes.insert(UPDATED_AT_FIELD.to_string(), now_timestamp());
    changes
}

/// Order groups by count descending, then value, so output is stable
pub(crate) fn sort_counts(counts: &mut [ValueCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
}
