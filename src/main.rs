//! HTTP dispatcher demo server
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ net::listener ─▶ transport (axum/hyper)        │
//!                           │                     │ aggregate body (≤ cap)     │
//!                           │                     ▼                            │
//!                           │               http::dispatcher                   │
//!                           │                     │ routing::registry lookup   │
//!                           │                     ▼                            │
//!                           │               handler (async task)               │
//!                           │                     │                            │
//!     Client Response       │                     ▼                            │
//!     ◀─────────────────────┼──────────── synthesized response                 │
//!                           │                                                  │
//!                           │  config · lifecycle · observability              │
//!                           └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use http_dispatcher::config::{load_config, ServerConfig};
use http_dispatcher::observability::{init_logging, metrics};
use http_dispatcher::{Handler, HandlerError, HttpServer, Request, Response};

#[derive(Parser)]
#[command(name = "http-dispatcher")]
#[command(about = "Minimal embeddable HTTP request dispatcher", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    init_logging(&config.observability)?;

    tracing::info!("http-dispatcher v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        port = config.listener.port,
        max_body_size = config.listener.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config);
    register_routes(&server);

    server.start().await?;
    server.stopped().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn register_routes(server: &HttpServer) {
    server.register(
        "GET",
        "/health",
        Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>("ok") }),
    );

    server.register(
        "GET",
        "/hello",
        Handler::new("text/plain", |req: Request| async move {
            let name = req.query("name").unwrap_or("world");
            Ok::<_, HandlerError>(format!("hello, {}", name))
        }),
    );

    server.register(
        "POST",
        "/echo",
        Handler::new("text/plain", |req: Request| async move {
            let mut resp = Response::builder().body(req.body());
            if let Some(content_type) = req.content_type() {
                resp = resp.content_type(content_type);
            }
            Ok::<_, HandlerError>(resp.build())
        }),
    );

    server.register(
        "GET",
        "/info",
        Handler::new("application/json", |req: Request| async move {
            Ok::<_, HandlerError>(serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "user_agent": req.header("user-agent"),
            }))
        }),
    );

    server.register(
        "DELETE",
        "/cache",
        Handler::new("text/plain", |_req| async { Ok::<_, HandlerError>(()) }),
    );
}
