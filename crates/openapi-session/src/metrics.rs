//! Request metrics
//!
//! - `openapi_requests_total` (counter): labels `request`, `outcome`
//! - `openapi_request_duration_seconds` (histogram): label `request`
//!
//! `outcome` is `ok` or the `Error::kind` label of the failure. The library
//! only records; installing a recorder is up to the host.

use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "openapi_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "openapi_request_duration_seconds";

/// Bucket boundaries from 5ms up to past the default 10s request deadline.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Prometheus builder with the request histogram configured as buckets.
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        metrics_exporter_prometheus::Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
        DURATION_BUCKETS,
    )
}

/// Install a global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    prometheus_builder()?.install_recorder()
}

/// Record one finished request.
pub fn record_request(request: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(REQUESTS_TOTAL, "request" => request, "outcome" => outcome).increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "request" => request)
        .record(elapsed.as_secs_f64());
}
