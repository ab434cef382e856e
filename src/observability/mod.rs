//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http/  (body decode outcomes)  ─┐
//! actions/ (action outcomes)     ─┼→ metrics.rs (counters) → Prometheus render
//! every subsystem                ─┴→ tracing events → logging.rs subscriber
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event, JSON output optional
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
