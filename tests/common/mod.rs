#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use freeflow_api::auth::{generate_jwt, Claims};
use freeflow_api::config::AppConfig;
use freeflow_api::resource::ResourceRegistry;
use freeflow_api::store::MemoryStore;
use freeflow_api::{app, fixtures, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub config: AppConfig,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the router on a free port, backed by an empty memory store
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development(), false).await
    }

    /// Same as [`TestServer::start`] with the demo fixtures seeded
    pub async fn start_seeded() -> Result<Self> {
        Self::start_with(AppConfig::development(), true).await
    }

    pub async fn start_with(config: AppConfig, seed: bool) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = MemoryStore::new();
        if seed {
            fixtures::seed_demo(&store, &ResourceRegistry::builtin(), config.demo.user_id).await?;
        }
        let state = AppState::new(config.clone(), Arc::new(store));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            config,
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signed session token for `user`
    pub fn token(&self, user: Uuid) -> Result<String> {
        self.token_with(Claims::new(user, None, None, 1))
    }

    pub fn token_with(&self, claims: Claims) -> Result<String> {
        Ok(generate_jwt(&self.config.security, &claims)?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Response status plus the decoded JSON envelope
pub async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await.context("response body is not JSON")?;
    Ok((status, body))
}

/// Id of a record returned in a `data` envelope
pub fn record_id(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}
