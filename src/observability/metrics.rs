//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatch outcomes by router
//!   (`path`, `host`) and outcome (`dispatched`, `redirect`, `not_found`,
//!   `method_not_allowed`, `bad_request`)
//!
//! Without an installed recorder the macros are no-ops, so the routing
//! core records unconditionally.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one dispatch outcome.
pub fn record_dispatch(router: &'static str, outcome: &'static str) {
    metrics::counter!("router_requests_total", "router" => router, "outcome" => outcome).increment(1);
}
