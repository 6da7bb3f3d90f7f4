use std::path::PathBuf;

use clap::Parser;
use deckbridge_server::ServerConfig;

/// Local bridge relaying control-surface button presses to open game tabs.
#[derive(Debug, Parser)]
#[command(name = "deckbridge", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Path to the game page served at /.
    #[arg(long, default_value = "index.html")]
    page: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        page_path: cli.page,
        ..Default::default()
    };

    let handle = deckbridge_server::start(config)
        .await
        .expect("Failed to start server");

    tracing::info!(port = handle.port, "Bridge ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}
