//! route-dispatch server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ axum (timeout, request ID, trace)
//!                        │
//!                        ▼
//!                     Context ──▶ AccessLog ──▶ Dispatcher
//!                                                  │ first matching route
//!                     ┌────────────────────────────┼──────────────────────┐
//!                     ▼                            ▼                      ▼
//!              Mount /mydashboard           Mount /version          GET /, GET /customers/{id:int},
//!              (dashboard pipeline)         (version pipeline)      POST A, POST B
//!                     │                            │                      │
//!                     └────────────────────────────┴──────────────────────┘
//!                                                  │
//!     Client Response                              ▼
//!     ◀─────────────── Context / HandlerError → Response
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_dispatch::app::build_pipeline;
use route_dispatch::config::{load_config, validate_config, AppConfig, LoadError};
use route_dispatch::http::HttpServer;
use route_dispatch::lifecycle::{shutdown_signal, Shutdown};
use route_dispatch::observability::{init_logging, metrics};
use route_dispatch::services::Services;

#[derive(Debug, Parser)]
#[command(name = "route-dispatch", version, about = "HTTP request dispatch server")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(LoadError::Validation)?;
    }

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "route-dispatch starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let services = Services::standard(&config);
    let pipeline = build_pipeline(&config, &services)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, pipeline);
    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
