use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Build the Prometheus recorder, install it globally and register all
/// application metrics. Returns a `PrometheusHandle` whose `render()` method
/// produces the text/plain Prometheus scrape payload.
///
/// Only the first call installs the global recorder; later calls (tests
/// building several apps in one process) get a detached handle.
pub fn init_metrics() -> PrometheusHandle {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::debug!("Metrics recorder already installed");
        return handle;
    }

    // Pre-register counters so they appear even before the first increment.
    counter!("risk_evaluations_total").absolute(0);
    counter!("malformed_records_total").absolute(0);
    counter!("market_cache_hits_total").absolute(0);
    counter!("market_cache_misses_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("circuit_breaker_tripped").set(0.0);
    gauge!("daily_loss_used_fraction").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("store_query_seconds").record(0.0);

    handle
}
