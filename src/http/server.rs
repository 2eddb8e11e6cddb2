//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (auth gate, tracing, limits, request ID)
//! - Bind server to listener
//! - Graceful shutdown on signal or broadcast

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{auth_middleware, CredentialStore};
use crate::config::GatewayConfig;
use crate::http::handlers::{get_rules, get_sum, health_check};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::rules::{RuleComposer, RuleRepository};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub composer: RuleComposer,
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(credentials: Arc<CredentialStore>, repository: Arc<dyn RuleRepository>) -> Self {
        Self {
            composer: RuleComposer::new(repository),
            credentials,
        }
    }
}

/// HTTP server for the rules gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and collaborators.
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        Self {
            router: build_router(&config, state),
        }
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let credentials = state.credentials.clone();
    Router::new()
        .route("/", get(health_check))
        .route("/ruleset", get(get_rules))
        .route("/sum", get(get_sum))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(credentials, auth_middleware))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}
