use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Prometheus metrics scrape endpoint.
/// Returns relay and dub-poll metrics in Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for every metric the service records.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "relay_requests_total",
        "Upstream relay calls issued, by capability"
    );
    metrics::describe_counter!(
        "relay_failures_total",
        "Relay calls that failed, by capability and failure kind"
    );
    metrics::describe_histogram!(
        "relay_duration_seconds",
        "Round-trip time of one upstream relay call"
    );
    metrics::describe_counter!("dub_jobs_submitted_total", "Dub jobs accepted by the upstream");
    metrics::describe_counter!("dub_poll_ticks_total", "Dub status polls, by outcome");
}
