use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::fixtures;
use crate::resource::{ResourceRegistry, ResourceSchema};
use crate::store::{MemoryStore, PgStore, RecordStore, StoreError};

/// Shared, immutable request context
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ResourceRegistry>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(ResourceRegistry::builtin()),
            store,
        }
    }

    /// Connect the configured backend: Postgres when a database URL is set,
    /// the in-memory store (optionally seeded with demo fixtures) otherwise
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn RecordStore> = if config.database.url.is_some() {
            Arc::new(PgStore::connect(&config.database).await?)
        } else {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            let memory = MemoryStore::new();
            if config.demo.enabled && config.demo.seed_fixtures {
                let registry = ResourceRegistry::builtin();
                let seeded = fixtures::seed_demo(&memory, &registry, config.demo.user_id).await?;
                tracing::info!("Seeded {} demo records for {}", seeded, config.demo.user_id);
            }
            Arc::new(memory)
        };

        Ok(Self::new(config, store))
    }

    /// Look up a resource by its URL name
    pub fn resource(&self, name: &str) -> Result<&ResourceSchema, ApiError> {
        self.registry
            .get(name)
            .ok_or_else(|| ApiError::not_found(format!("Unknown resource '{}'", name)))
    }
}
