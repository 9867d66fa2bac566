//! oaigate Server Binary
//!
//! Starts the OAI-PMH HTTP endpoint in front of the notification API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use oaigate::backend::JperClient;
use oaigate::{network, Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// oaigate Server
///
/// Settings come from `OAIGATE_*` environment variables; flags override them.
#[derive(Parser, Debug)]
#[command(name = "oaigate-server")]
#[command(about = "OAI-PMH endpoint for routed publication notifications")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Base URL of the notification API
    #[arg(short, long)]
    backend_url: Option<String>,

    /// API key for the notification API
    #[arg(long)]
    api_key: Option<String>,

    /// Repository name reported by Identify
    #[arg(long)]
    repo_name: Option<String>,

    /// Contact address reported by Identify
    #[arg(long)]
    admin_email: Option<String>,

    /// How many days back harvesters may reach
    #[arg(long)]
    lookback_days: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oaigate=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    // Environment first, then flags on top
    let mut config = Config::from_env().context("reading configuration")?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    if let Some(key) = args.api_key {
        config.backend_api_key = Some(key);
    }
    if let Some(name) = args.repo_name {
        config.repository_name = name;
    }
    if let Some(email) = args.admin_email {
        config.admin_email = email;
    }
    if let Some(days) = args.lookback_days {
        config.lookback = std::time::Duration::from_secs(days.saturating_mul(86_400));
    }

    tracing::info!("oaigate Server v{}", oaigate::VERSION);
    tracing::info!("Backend: {}", config.backend_url);
    tracing::info!("Listen address: {}", config.listen_addr);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {:?}", config.listen_addr))?;

    let client = JperClient::new(&config).context("building backend client")?;
    let engine = Arc::new(Engine::new(config, Arc::new(client)));

    tracing::info!("Engine initialized successfully");

    network::serve(addr, engine, shutdown_signal()).await?;
    Ok(())
}

/// Resolve on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, initiating shutdown...");
}
