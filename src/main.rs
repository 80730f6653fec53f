//! Care Portal Gateway
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                 CARE PORTAL GATEWAY                   │
//!                    │                                                       │
//!   Browser ─────────┼─▶ /proxy/*, /_/api/*, /_api/* ─▶ forwarder ──────────┼──▶ Backend API
//!                    │                                                       │
//!                    │   /session/menu, /session/landing ─▶ menu table       │
//!                    │                                                       │
//!                    │   pages ─▶ access control (section guard) ─▶ context  │
//!                    │                                                       │
//!                    │   config · logging · metrics · shutdown               │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use care_portal_gateway::config::load_with_env;
use care_portal_gateway::lifecycle::signals::shutdown_on_signal;
use care_portal_gateway::observability::{logging, metrics};
use care_portal_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "care-portal-gateway")]
#[command(about = "Same-origin gateway for the care portal", long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults to $PORTAL_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("PORTAL_CONFIG").map(PathBuf::from));

    let config = load_with_env(config_path.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!("care-portal-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        sections = config.access.sections.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);

    let mut serve = tokio::spawn(server.run(listener, server_shutdown));
    tokio::select! {
        result = &mut serve => result??,
        _ = shutdown_on_signal(&shutdown) => serve.await??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
