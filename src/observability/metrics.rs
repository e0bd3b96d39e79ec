//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (requests, latency, registrations)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, outcome
//! - `router_request_duration_seconds` (histogram): dispatch latency
//! - `router_routes_registered` (gauge): routes in the frozen registry
//! - `router_registration_rejections_total` (counter): rejected methods by controller
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op, so tests need no setup
//! - Labels stay low-cardinality: no item ids or paths, and methods outside
//!   GET/PUT/POST/DELETE share the `other` label

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Bounded `method` label for a client-supplied HTTP method.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "PUT" => "PUT",
        "POST" => "POST",
        "DELETE" => "DELETE",
        _ => "other",
    }
}

/// Record one finished dispatch.
pub fn record_dispatch(method: &str, outcome: &'static str, start: Instant) {
    let method = method_label(method);
    counter!("router_requests_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("router_request_duration_seconds", "method" => method, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record the methods of one controller that failed registration.
pub fn record_registration(controller: &str, rejected: usize) {
    if rejected > 0 {
        counter!("router_registration_rejections_total", "controller" => controller.to_string())
            .increment(rejected as u64);
    }
}

/// Record the size of the frozen registry.
pub fn record_routes_total(routes: usize) {
    gauge!("router_routes_registered").set(routes as f64);
}
