use freeflow_api::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and SECURITY_JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    server::init_tracing("freeflow_api=info,tower_http=info");

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();

    server::serve(config).await
}
