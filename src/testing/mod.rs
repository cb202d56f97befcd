//! Helpers for router-level unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config::AppConfig;
use crate::resource::{ListQuery, Record, ResourceSchema};
use crate::state::AppState;
use crate::store::{MemoryStore, RecordPage, RecordStore, StoreError, ValueCount};

/// Memory store that counts every data operation it serves
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn list(&self, schema: &ResourceSchema, owner: Uuid, query: &ListQuery) -> Result<RecordPage, StoreError> {
        self.hit();
        self.inner.list(schema, owner, query).await
    }

    async fn get(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<Option<Record>, StoreError> {
        self.hit();
        self.inner.get(schema, owner, id).await
    }

    async fn insert(&self, schema: &ResourceSchema, owner: Uuid, record: Record) -> Result<Record, StoreError> {
        self.hit();
        self.inner.insert(schema, owner, record).await
    }

    async fn update(
        &self,
        schema: &ResourceSchema,
        owner: Uuid,
        id: Uuid,
        changes: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.hit();
        self.inner.update(schema, owner, id, changes).await
    }

    async fn delete(&self, schema: &ResourceSchema, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete(schema, owner, id).await
    }

    async fn count_by(&self, schema: &ResourceSchema, owner: Uuid, column: &str) -> Result<Vec<ValueCount>, StoreError> {
        self.hit();
        self.inner.count_by(schema, owner, column).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

/// Development configuration with demo mode on and an empty demo-account list
pub fn test_config() -> AppConfig {
    AppConfig::development()
}

pub fn test_state(store: Arc<dyn RecordStore>) -> AppState {
    AppState::new(test_config(), store)
}

/// `Authorization` header value for a fresh session token
pub fn bearer(state: &AppState, user: Uuid, email: Option<&str>) -> String {
    let claims = Claims::new(user, None, email.map(str::to_string), 1);
    let token = generate_jwt(&state.config.security, &claims).expect("test token");
    format!("Bearer {}", token)
}
