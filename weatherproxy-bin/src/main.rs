use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weatherproxy_bin::{AppState, app};
use weatherproxy_core::{
    config::Config,
    interceptor::{self, KNOWN_CLIENTS},
    registry::ClientRegistry,
    service::WeatherService,
};

#[derive(Parser)]
#[command(author, version, about = "city weather lookup HTTP service", long_about = None)]
struct Cli {
    /// Path to a JSON or TOML config file; stock configuration when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, default_value_t = 7001)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    let registry = ClientRegistry::from_config(&cfg)?;
    interceptor::install_logging(&registry, KNOWN_CLIENTS);

    // A missing weather client fails here, at startup, not per request.
    let weather = WeatherService::from_registry(&registry, &cfg)?;
    let state = AppState {
        weather: Arc::new(weather),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
