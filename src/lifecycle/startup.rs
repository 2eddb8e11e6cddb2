//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Load the credential table
//! - Build the rule backend and application state
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Every step returns a `StartupError`; only `main` decides to exit
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::auth::{CredentialError, CredentialSource, CredentialStore};
use crate::config::{apply_port_override, load_config, ConfigError, GatewayConfig};
use crate::config::loader::{parse_config, PORT_ENV};
use crate::http::{AppState, HttpServer};
use crate::observability::metrics;
use crate::rules::FsRuleRepository;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("credential error: {0}")]
    Credentials(#[from] CredentialError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load configuration from `path` (defaults when absent) and apply the
/// `PORT` override taken from the environment.
pub fn load_configuration(path: Option<&Path>) -> Result<(GatewayConfig, bool), StartupError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => parse_config("")?,
    };
    let port = std::env::var(PORT_ENV).ok();
    let overridden = apply_port_override(&mut config, port.as_deref())?;
    Ok((config, overridden))
}

/// Everything needed to start serving.
#[derive(Debug)]
pub struct Bootstrap {
    pub config: GatewayConfig,
    pub state: AppState,
}

/// Load credentials and assemble application state for `config`.
pub fn bootstrap(config: GatewayConfig) -> Result<Bootstrap, StartupError> {
    let source = CredentialSource::from_config(&config.auth)?;
    let credentials = Arc::new(CredentialStore::load(&source)?);

    let repository = FsRuleRepository::new(&config.rules.directory);
    if !repository.root().is_dir() {
        tracing::warn!(
            dir = %repository.root().display(),
            "Rules directory does not exist yet, requests will fail until it does"
        );
    }

    Ok(Bootstrap {
        state: AppState::new(credentials, Arc::new(repository)),
        config,
    })
}

impl Bootstrap {
    /// Bind the listener and serve until shutdown.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        if self.config.observability.metrics_enabled {
            match self.config.observability.metrics_address.parse::<SocketAddr>() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(_) => tracing::error!(
                    metrics_address = %self.config.observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }

        let address = self.config.listener.bind_address.clone();
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(source) => return Err(StartupError::Bind { address, source }),
        };

        HttpServer::new(self.config, self.state)
            .run(listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}
