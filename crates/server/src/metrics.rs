//! Prometheus metrics for observability.
//!
//! This module exposes the core organiser metrics alongside:
//! - HTTP request metrics (latency, counts)
//! - Organiser status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelink_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelink_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

// =============================================================================
// Organiser Metrics (collected dynamically)
// =============================================================================

/// Organiser running state (1 = running, 0 = stopped).
pub static ORGANISER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelink_organiser_running",
        "Whether the scan loop is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Unix timestamp of the last finished scan cycle.
pub static LAST_SCAN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelink_last_scan_timestamp_seconds",
        "Unix time at which the last scan cycle finished",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();

    // Organiser
    registry
        .register(Box::new(ORGANISER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_SCAN_TIMESTAMP.clone()))
        .unwrap();

    // Core metrics (scan cycles, links, catalog lookups)
    for metric in reelink_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the organiser's status.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.organiser().status().await;
    ORGANISER_RUNNING.set(if status.running { 1 } else { 0 });

    if let Some(report) = &status.last_report {
        LAST_SCAN_TIMESTAMP.set(report.finished_at.timestamp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/health", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("reelink_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_includes_core_metrics() {
        // Vec metrics only appear once a label set has been touched
        reelink_core::metrics::SCAN_CYCLES
            .with_label_values(&["success"])
            .inc_by(0);
        reelink_core::metrics::SWEEP_LINKS_REMOVED.inc_by(0);
        ORGANISER_RUNNING.set(0);

        let output = encode_metrics();

        assert!(output.contains("reelink_scan_cycles_total"));
        assert!(output.contains("reelink_sweep_links_removed_total"));
        assert!(output.contains("reelink_organiser_running"));
    }
}
