//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Ingestion**: Accepted and rejected alerts
//! - **Delivery**: Per-connection handoffs and failures
//! - **Connections**: Opened connections and the live count
//! - **Latency**: Broadcast duration
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the main HTTP port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Idempotent: later calls return the handle installed by the first.
///
/// # Panics
///
/// Panics if another global recorder was installed outside this module.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Ingestion
    describe_counter!(
        "slot_notifier_notifications_total",
        "Total alerts accepted and broadcast"
    );
    describe_counter!(
        "slot_notifier_ingest_rejected_total",
        "Total alerts rejected by reason"
    );

    // Delivery
    describe_counter!(
        "slot_notifier_deliveries_total",
        "Total envelopes handed to subscriber connections"
    );
    describe_counter!(
        "slot_notifier_delivery_failures_total",
        "Total per-connection send failures by reason"
    );

    // Connections
    describe_counter!(
        "slot_notifier_connections_opened_total",
        "Total subscriber connections accepted"
    );
    describe_gauge!(
        "slot_notifier_active_clients",
        "Number of registered subscriber connections"
    );
    describe_counter!(
        "slot_notifier_malformed_envelopes_total",
        "Total inbound envelopes ignored as malformed or unknown"
    );

    // Latency
    describe_histogram!(
        "slot_notifier_broadcast_seconds",
        "Time to hand one notification to every subscriber"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record an accepted alert.
pub fn record_notification() {
    counter!("slot_notifier_notifications_total").increment(1);
}

/// Record a rejected alert.
pub fn record_ingest_rejected(reason: &'static str) {
    counter!("slot_notifier_ingest_rejected_total", "reason" => reason).increment(1);
}

/// Record successful handoffs from one broadcast.
pub fn record_deliveries(count: u64) {
    counter!("slot_notifier_deliveries_total").increment(count);
}

/// Record one failed handoff.
pub fn record_delivery_failure(reason: &'static str) {
    counter!("slot_notifier_delivery_failures_total", "reason" => reason).increment(1);
}

/// Record an accepted subscriber connection.
pub fn record_connection_opened() {
    counter!("slot_notifier_connections_opened_total").increment(1);
}

/// Update the registered connection count.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_clients(count: usize) {
    gauge!("slot_notifier_active_clients").set(count as f64);
}

/// Record an ignored inbound envelope.
pub fn record_malformed_envelope() {
    counter!("slot_notifier_malformed_envelopes_total").increment(1);
}

/// Record broadcast duration.
pub fn record_broadcast_duration(duration: Duration) {
    histogram!("slot_notifier_broadcast_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_notification();
        record_ingest_rejected("unauthorized");
        record_deliveries(3);
        record_delivery_failure("full");
        record_connection_opened();
        set_active_clients(2);
        record_malformed_envelope();
        record_broadcast_duration(Duration::from_millis(1));
    }

    #[test]
    fn rendered_output_names_recorded_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let local = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_notification();
            record_delivery_failure("closed");
        });

        let rendered = local.render();
        assert!(rendered.contains("slot_notifier_notifications_total"));
        assert!(rendered.contains(r#"slot_notifier_delivery_failures_total{reason="closed"}"#));
    }
}
