//! Rules gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ auth gate ──▶ handlers ──▶ rule composer
//!                      (tower-http     (token        (/ruleset,      │
//!                       layers)         table)        /sum, /)       ▼
//!                                                              rule repository
//!     Client Response                                          (rules directory)
//!     ◀──────────────────────────────────────── composed text / sha256
//! ```
//!
//! Startup is fatal on any configuration or credential error; nothing is
//! served until the credential table has loaded completely.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rules_gateway::config::loader::PORT_ENV;
use rules_gateway::lifecycle::startup::{bootstrap, load_configuration};
use rules_gateway::lifecycle::Shutdown;
use rules_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "rules-gateway")]
#[command(about = "Serves composed rule documents to authenticated callers", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "RULES_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (config, port_overridden) = match load_configuration(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    tracing::info!("rules-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if !port_overridden && args.config.is_none() {
        tracing::warn!(
            bind_address = %config.listener.bind_address,
            "no {} env var set, using default", PORT_ENV
        );
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules_dir = %config.rules.directory,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let boot = match bootstrap(config) {
        Ok(boot) => boot,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    if let Err(e) = boot.serve(shutdown.subscribe()).await {
        tracing::error!(error = %e, "http server stopped");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
