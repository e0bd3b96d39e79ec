//! Convention router server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum server ──▶ request id / timeout / trace layers
//!                                          │
//!                                          ▼
//!                                     Dispatcher
//!                          identity ── descriptor ── method name
//!                                          │
//!                                          ▼
//!                                    RouteRegistry ──▶ controller method
//!                                          │
//!     Client Response                      ▼
//!     ◀────────────── JSON payload, raw response, or plain-text 500
//! ```
//!
//! Startup order: config, logging, metrics, registry, listener.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use convention_router::admin::StatusController;
use convention_router::config::resolve_config;
use convention_router::lifecycle::{trigger_on_signal, Shutdown};
use convention_router::observability::{init_logging, init_metrics};
use convention_router::{HttpServer, RegistryBuilder};

#[derive(Parser)]
#[command(name = "convention-router")]
#[command(about = "Convention-over-configuration HTTP request router", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the registered route keys and exit.
    #[arg(long)]
    print_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.bind)?;

    init_logging(&config.observability)?;

    tracing::info!("convention-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        strict_paths = config.dispatch.strict_paths,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut builder = RegistryBuilder::new();
    builder.register("status", StatusController::new())?;
    let registry = builder.build();

    if cli.print_routes {
        for key in registry.keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, registry)?;
    let stop = shutdown.subscribe();
    tokio::spawn(async move { trigger_on_signal(&shutdown).await });

    server.run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
