use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::resource::schema::ID_FIELD;
use crate::resource::{ListQuery, Record, ResourceSchema, SortOrder};

use super::{sort_counts, stamp_new, stamp_update, RecordPage, RecordStore, StoreError, ValueCount};

/// Process-local store used for tests and database-less demo runs
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, Vec<Record>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table across all owners
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }
}

fn owned_by(schema: &ResourceSchema, owner: &str, record: &Record) -> bool {
    record.get(schema.owner_column).and_then(Value::as_str) == Some(owner)
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get(ID_FIELD).and_then(Value::as_str) == Some(id)
}

/// Text form used for equality filters and grouping
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn row_matches(schema: &ResourceSchema, query: &ListQuery, record: &Record) -> bool {
    let filters_match = query.filters.iter().all(|filter| {
        record
            .get(filter.column)
            .and_then(value_text)
            .is_some_and(|v| filter.values.contains(&v))
    });
    if !filters_match {
        return false;
    }

    match &query.search {
        None => true,
        Some(term) => {
            let needle = term.to_lowercase();
            schema.searchable_fields().any(|f| {
                record
                    .get(f.name)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
        }
    }
}

/// Order two sort keys; nulls sort last in either direction
fn compare_sort_keys(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => compare_values(x, y),
            SortOrder::Desc => compare_values(x, y).reverse(),
        },
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Timestamps compare as instants, whatever their offset
        (Value::String(x), Value::String(y)) => match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let owner = owner.to_string();
        let tables = self.tables.read().await;
        let mut rows: Vec<&Record> = tables
            .get(schema.table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| owned_by(schema, &owner, r) && row_matches(schema, query, r))
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            compare_sort_keys(a.get(query.sort_by), b.get(query.sort_by), query.sort_order)
                .then_with(|| compare_sort_keys(a.get(ID_FIELD), b.get(ID_FIELD), SortOrder::Asc))
        });

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(RecordPage { items, total })
    }

    async fn get(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<Option<Record>, StoreError> {
        let (owner, id) = (owner.to_string(), id.to_string());
        let tables = self.tables.read().await;
        Ok(tables
            .get(schema.table)
            .and_then(|rows| rows.iter().find(|r| has_id(r, &id) && owned_by(schema, &owner, r)))
            .cloned())
    }

    async fn insert(&self, schema: &ResourceSchema, owner: Uuid, record: Record) -> Result<Record, StoreError> {
        let record = stamp_new(schema, owner, record);
        let mut tables = self.tables.write().await;
        tables.entry(schema.table).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        schema: &ResourceSchema,
        owner: Uuid,
        id: Uuid,
        changes: Record,
    ) -> Result<Option<Record>, StoreError> {
        let (owner, id) = (owner.to_string(), id.to_string());
        let changes = stamp_update(schema, changes);
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(schema.table)
            .and_then(|rows| rows.iter_mut().find(|r| has_id(r, &id) && owned_by(schema, &owner, r)))
        else {
            return Ok(None);
        };

        row.extend(changes);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let (owner, id) = (owner.to_string(), id.to_string());
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(schema.table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !(has_id(r, &id) && owned_by(schema, &owner, r)));
        Ok(rows.len() < before)
    }

    async fn count_by(&self, schema: &ResourceSchema, owner: Uuid, column: &str) -> Result<Vec<ValueCount>, StoreError> {
        let owner = owner.to_string();
        let tables = self.tables.read().await;
        let mut groups: HashMap<String, u64> = HashMap::new();
        for row in tables.get(schema.table).into_iter().flatten() {
            if owned_by(schema, &owner, row) {
                let key = row.get(column).and_then(value_text).unwrap_or_else(|| "null".to_string());
                *groups.entry(key).or_default() += 1;
            }
        }

        let mut counts: Vec<ValueCount> = groups
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect();
        sort_counts(&mut counts);
        Ok(counts)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
