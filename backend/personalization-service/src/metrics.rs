//! Personalization Metrics
//!
//! Prometheus metrics for feed composition and the signal lifecycle

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

static FEEDS_COMPOSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "personalization_feeds_composed_total",
        "Total feeds composed by source (rules/default)",
        &["source"]
    )
    .expect("Failed to register feeds composed metric")
});

static ITEMS_SKIPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "personalization_items_skipped_total",
        "Catalog items dropped because their condition could not be evaluated",
        &["family"]
    )
    .expect("Failed to register items skipped metric")
});

static SIGNAL_PURGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "personalization_signal_purges_total",
        "Signal purges triggered by disabling personalization (success/error)",
        &["status"]
    )
    .expect("Failed to register signal purges metric")
});

static INTERACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "personalization_interactions_total",
        "Interaction events by kind and outcome (recorded/ignored)",
        &["kind", "outcome"]
    )
    .expect("Failed to register interactions metric")
});

/// Record a composed feed by source
pub fn record_feed_composed(source: &str) {
    FEEDS_COMPOSED_TOTAL.with_label_values(&[source]).inc();
}

/// Record a catalog item skipped during evaluation
pub fn record_item_skipped(family: &str) {
    ITEMS_SKIPPED_TOTAL.with_label_values(&[family]).inc();
}

/// Record a signal purge result (success/error)
pub fn record_signal_purge(status: &str) {
    SIGNAL_PURGES_TOTAL.with_label_values(&[status]).inc();
}

/// Record an interaction event
pub fn record_interaction(kind: &str, outcome: &str) {
    INTERACTIONS_TOTAL.with_label_values(&[kind, outcome]).inc();
}

/// Render the default registry in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_service_counters() {
        record_signal_purge("success");
        let text = render().unwrap();
        assert!(text.contains("personalization_signal_purges_total"));
    }

    // The `process` feature registers a process collector in the default
    // registry on linux
    #[cfg(target_os = "linux")]
    #[test]
    fn test_render_includes_process_metrics() {
        let text = render().unwrap();
        assert!(text.contains("process_cpu_seconds_total"));
    }
}
