use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::resource::schema::{ID_FIELD, UPDATED_AT_FIELD};
use crate::resource::{ListQuery, Record, ResourceSchema};

use super::{sort_counts, stamp_new, stamp_update, RecordPage, RecordStore, StoreError, ValueCount};

/// Postgres-backed store. Table and column names only ever come from the
/// resource registry and are quoted; every value is bound.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    log_queries: bool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self::from_pool(pool, config.enable_query_logging))
    }

    pub fn from_pool(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    fn trace(&self, sql: &str) {
        if self.log_queries {
            tracing::debug!(target: "freeflow_api::sql", "{}", sql);
        }
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape LIKE wildcards so a search term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// `FROM "table" AS t WHERE owner = $1 [AND filters] [AND search]`
fn push_scoped_from(builder: &mut QueryBuilder<'_, Postgres>, schema: &ResourceSchema, owner: Uuid, query: Option<&ListQuery>) {
    builder.push(" FROM ");
    builder.push(quote_identifier(schema.table));
    builder.push(" AS t WHERE t.");
    builder.push(quote_identifier(schema.owner_column));
    builder.push(" = ");
    builder.push_bind(owner);

    let Some(query) = query else {
        return;
    };

    for filter in &query.filters {
        builder.push(" AND t.");
        builder.push(quote_identifier(filter.column));
        builder.push("::text = ANY(");
        builder.push_bind(filter.values.clone());
        builder.push(")");
    }

    if let Some(term) = &query.search {
        let mut fields = schema.searchable_fields().peekable();
        if fields.peek().is_some() {
            let pattern = like_pattern(term);
            builder.push(" AND (");
            for (i, field) in fields.enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push("t.");
                builder.push(quote_identifier(field.name));
                builder.push(" ILIKE ");
                builder.push_bind(pattern.clone());
            }
            builder.push(")");
        }
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<Record, StoreError> {
    let value: Value = row.try_get("row")?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Query(format!("unexpected record format: {}", other))),
    }
}

fn column_list(columns: &[&str]) -> String {
    columns.iter().map(|c| quote_identifier(c)).collect::<Vec<_>>().join(", ")
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        // unique_violation
        if db.code().as_deref() == Some("23505") {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

fn list_count_query(schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) AS count");
    push_scoped_from(&mut count, schema, owner, Some(query));
    count
}

fn list_select_query(schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut select = QueryBuilder::new("SELECT to_jsonb(t.*) AS row");
    push_scoped_from(&mut select, schema, owner, Some(query));
    select.push(" ORDER BY t.");
    select.push(quote_identifier(query.sort_by));
    select.push(" ");
    select.push(query.sort_order.to_sql());
    select.push(" NULLS LAST, t.");
    select.push(quote_identifier(ID_FIELD));
    select.push(" ASC LIMIT ");
    select.push_bind(i64::from(query.limit));
    select.push(" OFFSET ");
    select.push_bind(query.offset() as i64);
    select
}

fn get_query(schema: &ResourceSchema, owner: Uuid, id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut select = QueryBuilder::new("SELECT to_jsonb(t.*) AS row");
    push_scoped_from(&mut select, schema, owner, None);
    select.push(" AND t.");
    select.push(quote_identifier(ID_FIELD));
    select.push(" = ");
    select.push_bind(id);
    select
}

fn insert_query(schema: &ResourceSchema, record: Record) -> QueryBuilder<'static, Postgres> {
    let columns = column_list(&schema.columns());
    let table = quote_identifier(schema.table);

    let mut insert = QueryBuilder::new("INSERT INTO ");
    insert.push(&table);
    insert.push(" AS t (");
    insert.push(&columns);
    insert.push(") SELECT ");
    insert.push(&columns);
    insert.push(" FROM jsonb_populate_record(NULL::");
    insert.push(&table);
    insert.push(", ");
    insert.push_bind(Value::Object(record));
    insert.push(") RETURNING to_jsonb(t.*) AS row");
    insert
}

fn update_query(schema: &ResourceSchema, owner: Uuid, id: Uuid, changes: Record) -> QueryBuilder<'static, Postgres> {
    let changed: Vec<&str> = schema
        .columns()
        .into_iter()
        .filter(|c| changes.contains_key(*c) || *c == UPDATED_AT_FIELD)
        .collect();
    let columns = column_list(&changed);
    let table = quote_identifier(schema.table);

    let mut update = QueryBuilder::new("UPDATE ");
    update.push(&table);
    update.push(" AS t SET (");
    update.push(&columns);
    update.push(") = (SELECT ");
    update.push(&columns);
    update.push(" FROM jsonb_populate_record(NULL::");
    update.push(&table);
    update.push(", ");
    update.push_bind(Value::Object(changes));
    update.push("))");
    push_owned_row(&mut update, schema, owner, id);
    update.push(" RETURNING to_jsonb(t.*) AS row");
    update
}

fn delete_query(schema: &ResourceSchema, owner: Uuid, id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut delete = QueryBuilder::new("DELETE FROM ");
    delete.push(quote_identifier(schema.table));
    delete.push(" AS t");
    push_owned_row(&mut delete, schema, owner, id);
    delete
}

fn count_by_query(schema: &ResourceSchema, owner: Uuid, column: &str) -> QueryBuilder<'static, Postgres> {
    let mut select = QueryBuilder::new("SELECT COALESCE(t.");
    select.push(quote_identifier(column));
    select.push("::text, 'null') AS value, COUNT(*) AS count");
    push_scoped_from(&mut select, schema, owner, None);
    select.push(" GROUP BY 1");
    select
}

/// ` WHERE t.id = $n AND t.owner = $m`
fn push_owned_row(builder: &mut QueryBuilder<'_, Postgres>, schema: &ResourceSchema, owner: Uuid, id: Uuid) {
    builder.push(" WHERE t.");
    builder.push(quote_identifier(ID_FIELD));
    builder.push(" = ");
    builder.push_bind(id);
    builder.push(" AND t.");
    builder.push(quote_identifier(schema.owner_column));
    builder.push(" = ");
    builder.push_bind(owner);
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list(&self, schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let mut count = list_count_query(schema, owner, query);
        self.trace(count.sql());
        let total: i64 = count.build().fetch_one(&self.pool).await?.try_get("count")?;

        let mut select = list_select_query(schema, owner, query);
        self.trace(select.sql());
        let rows = select.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(row_to_record).collect::<Result<Vec<_>, _>>()?;

        Ok(RecordPage {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn get(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<Option<Record>, StoreError> {
        let mut select = get_query(schema, owner, id);
        self.trace(select.sql());

        let row = select.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn insert(&self, schema: &ResourceSchema, owner: Uuid, record: Record) -> Result<Record, StoreError> {
        let mut insert = insert_query(schema, stamp_new(schema, owner, record));
        self.trace(insert.sql());

        let row = insert.build().fetch_one(&self.pool).await.map_err(map_write_error)?;
        row_to_record(&row)
    }

    async fn update(
        &self,
        schema: &ResourceSchema,
        owner: Uuid,
        id: Uuid,
        changes: Record,
    ) -> Result<Option<Record>, StoreError> {
        let mut update = update_query(schema, owner, id, stamp_update(schema, changes));
        self.trace(update.sql());

        let row = update.build().fetch_optional(&self.pool).await.map_err(map_write_error)?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn delete(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut delete = delete_query(schema, owner, id);
        self.trace(delete.sql());

        let result = delete.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by(&self, schema: &ResourceSchema, owner: Uuid, column: &str) -> Result<Vec<ValueCount>, StoreError> {
        let Some(spec) = schema.field_spec(column) else {
            return Err(StoreError::Query(format!("unknown column '{}' on {}", column, schema.table)));
        };

        let mut select = count_by_query(schema, owner, spec.name);
        self.trace(select.sql());

        let rows = select.build().fetch_all(&self.pool).await?;
        let mut counts = rows
            .iter()
            .map(|row| {
                let value: String = row.try_get("value")?;
                let count: i64 = row.try_get("count")?;
                Ok(ValueCount {
                    value,
                    count: count.max(0) as u64,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        sort_counts(&mut counts);
        Ok(counts)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
