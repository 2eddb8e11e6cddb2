//! Rules gateway library.
//!
//! Serves a configuration document composed from a base rule file plus
//! caller-selected overlays, behind a shared-secret token gate.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rules;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rules::RuleComposer;
