//! Metrics collection and exposition.
//!
//! # Metrics
//! - `equal_body_decode_total` (counter): decoded payloads by content type
//!   and outcome (`structured`, `raw`, `fallback`)
//! - `equal_action_total` (counter): action runs by action and outcome
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - The Prometheus handle renders on demand, no listener is spawned

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const BODY_DECODE_TOTAL: &str = "equal_body_decode_total";
pub const ACTION_TOTAL: &str = "equal_action_total";

/// Install the Prometheus recorder as the global metrics sink.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    ::metrics::describe_counter!(BODY_DECODE_TOTAL, "Message bodies decoded, by outcome");
    ::metrics::describe_counter!(ACTION_TOTAL, "Action invocations, by outcome");
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

pub fn record_body_decode(content_type: &str, outcome: &'static str) {
    ::metrics::counter!(
        BODY_DECODE_TOTAL,
        "content_type" => content_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_action(action: &'static str, outcome: &'static str) {
    ::metrics::counter!(ACTION_TOTAL, "action" => action, "outcome" => outcome).increment(1);
}
