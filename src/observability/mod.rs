//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! auth gate, composer, server:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, optional Prometheus endpoint)
//! ```

pub mod logging;
pub mod metrics;
