//! Alias dispatch service.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                  ALIAS DISPATCH                   │
//!                       │                                                   │
//!   config servlets ────┼─▶ HttpService ─▶ AliasRegistry ─▶ HandlerRegistry │
//!   admin API ──────────┼──────────────────────▲                  │         │
//!                       │                                         ▼         │
//!   Client Request ─────┼─▶ HttpServer ─▶ dispatch (filters → servlet)      │
//!                       │                                                   │
//!                       │   config · observability · lifecycle              │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use alias_dispatch::admin::{self, AdminState};
use alias_dispatch::config::{load_config, ServiceConfig};
use alias_dispatch::handler::{RankedHandlerRegistry, ServletContext};
use alias_dispatch::lifecycle::{run_with_registrations, wait_for_signal, Shutdown};
use alias_dispatch::observability::{logging, metrics};
use alias_dispatch::{AliasRegistry, HttpServer, HttpService};

#[derive(Parser)]
#[command(name = "alias-dispatch")]
#[command(about = "Dynamic servlet dispatch keyed by unique path aliases", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "alias-dispatch starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        servlets = config.servlets.len(),
        admin_enabled = config.admin.enabled,
        request_timeout_secs = config.timeouts.request_secs,
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

    let handlers = Arc::new(RankedHandlerRegistry::new());
    let registry = Arc::new(
        AliasRegistry::builder()
            .handler_registry(handlers.clone())
            .build()?,
    );
    let context = Arc::new(ServletContext::new(config.context.name.clone()));
    let service = HttpService::new(registry.clone(), context);

    let result = run_with_registrations(&service, &config.servlets, || {
        serve(&config, handlers, registry.clone())
    })
    .await;

    tracing::info!(remaining_aliases = registry.len(), "Shutdown complete");
    result
}

/// Serve dispatch and admin traffic until a signal arrives.
async fn serve(
    config: &ServiceConfig,
    handlers: Arc<RankedHandlerRegistry>,
    registry: Arc<AliasRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let server = HttpServer::new(config.clone(), handlers);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let admin_task = admin_listener.map(|listener| {
        let state = AdminState::new(registry, &config.admin.api_key);
        tokio::spawn(admin::serve(listener, state, shutdown.subscribe()))
    });

    wait_for_signal().await;
    shutdown.trigger();

    let server_result = server_task.await;
    if let Some(task) = admin_task {
        task.await??;
    }
    server_result??;
    Ok(())
}
