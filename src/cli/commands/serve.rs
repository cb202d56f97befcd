use clap::Args;

use crate::config;
use crate::server;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides FREEFLOW_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides FREEFLOW_API_HOST)")]
    pub host: Option<String>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    server::serve(config).await
}
