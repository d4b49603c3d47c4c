//! vidgate server binary entry point.

use std::net::SocketAddr;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use vidgate::config::GatewayConfig;
use vidgate::gateway::Gateway;

/// Quota-protecting metadata gateway for the YouTube Data API.
#[derive(Parser)]
#[command(name = "vidgate", version, about)]
struct Cli {
    /// Listen address, overriding VIDGATE_BIND.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidgate=info")),
        )
        .init();

    let mut config = GatewayConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if !config.has_credential() {
        warn!("YOUTUBE_API_KEY is not set; every request will be rejected with 503");
    }

    if let Err(e) = vidgate::server::run(Gateway::from_config(config)).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
