//! EstateDesk authorization API server
//!
//! # Usage
//!
//! ```bash
//! # Built-in grant table on 0.0.0.0:8080
//! authz-server
//!
//! # Grant table from a JSON file
//! authz-server --grants config/grants.json
//!
//! # Trace every decision
//! RUST_LOG=estatedesk_authz=trace,api_server=debug authz-server
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (overrides `--log-level`)
//! - `API_SERVER_HOST`: server host (default: 0.0.0.0)
//! - `API_SERVER_PORT`: server port (default: 8080)
//! - `API_SERVER_JSON_LOGS`: JSON log output
//! - `AUTHZ_GRANTS_PATH`: grant table file (default: built-in table)
//! - `AUTHZ_AUDIT_CAPACITY`: audit entries kept in memory (default: 10000)

use anyhow::{Context, Result};
use api_server::{server::ServerBuilder, state::AppState};
use clap::Parser;
use estatedesk_authz::{AuthzEngine, GrantTable};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// EstateDesk authorization API server
#[derive(Parser, Debug)]
#[command(
    name = "authz-server",
    version,
    about = "REST API server for the EstateDesk authorization engine",
    long_about = None
)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "API_SERVER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "API_SERVER_PORT")]
    port: u16,

    /// Grant table JSON file; the built-in table is used when absent
    #[arg(short = 'g', long, env = "AUTHZ_GRANTS_PATH")]
    grants: Option<PathBuf>,

    /// Audit entries kept in memory
    #[arg(long, default_value = "10000", env = "AUTHZ_AUDIT_CAPACITY")]
    audit_capacity: usize,

    /// Enable JSON logging format
    #[arg(long, env = "API_SERVER_JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);

    info!("Starting EstateDesk authorization server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let grants = load_grants(&args)?;
    let engine = AuthzEngine::new(grants);
    let state = Arc::new(AppState::new(engine, args.audit_capacity));
    info!(audit_capacity = args.audit_capacity, "Application state initialized");

    let server = ServerBuilder::new()
        .host(&args.host)
        .port(args.port)
        .state(state)
        .build()?;

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Grant table from `--grants`, or the built-in one
///
/// A broken grant file aborts start-up.
fn load_grants(args: &Args) -> Result<GrantTable> {
    match &args.grants {
        Some(path) => GrantTable::load(path)
            .with_context(|| format!("Failed to load grant table from {}", path.display())),
        None => {
            info!("Using built-in grant table");
            Ok(GrantTable::builtin())
        }
    }
}

/// Initialize tracing/logging subsystem
fn init_tracing(args: &Args) {
    let log_level = args.log_level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        tracing::Level::INFO
    });
    let deps_level = if log_level <= tracing::Level::DEBUG {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "api_server={},authz_server={},estatedesk_authz={},tower_http={},axum={}",
            log_level, log_level, log_level, deps_level, deps_level
        )
        .into()
    });

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
