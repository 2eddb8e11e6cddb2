//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rules_gateway::auth::CredentialStore;
use rules_gateway::config::GatewayConfig;
use rules_gateway::http::{AppState, HttpServer};
use rules_gateway::lifecycle::Shutdown;
use rules_gateway::rules::FsRuleRepository;

/// Write `(file name, body)` pairs into `dir`.
pub fn write_rules(dir: &Path, files: &[(&str, &str)]) {
    for (name, body) in files {
        std::fs::write(dir.join(name), body).unwrap();
    }
}

/// A running gateway bound to an ephemeral local port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway serving `rules_dir`, with the credentials in `users`.
pub async fn start_gateway(rules_dir: &Path, users: &[(&str, &str)]) -> TestGateway {
    let credentials: CredentialStore = users
        .iter()
        .map(|(token, user)| (token.to_string(), user.to_string()))
        .collect();
    let state = AppState::new(
        Arc::new(credentials),
        Arc::new(FsRuleRepository::new(rules_dir)),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(GatewayConfig::default(), state);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
