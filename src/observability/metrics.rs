//! Metric instruments.
//!
//! # Metrics
//! - `http.server.request.duration` (histogram, s): per instrumented route, method, status
//! - `work.requests` (counter): `/work` outcomes by status
//! - `work.simulated_latency` (histogram, ms): injected latency per request
//!
//! Aggregation and export happen in the meter provider's periodic reader.

use std::time::Duration;

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

/// Instruments recorded by the route layer.
#[derive(Clone)]
pub struct HttpServerMetrics {
    request_duration: Histogram<f64>,
}

impl HttpServerMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            request_duration: meter
                .f64_histogram("http.server.request.duration")
                .with_description("Duration of HTTP server requests")
                .with_unit("s")
                .build(),
        }
    }

    pub fn record_request(&self, route: &'static str, method: &str, status: u16, elapsed: Duration) {
        self.request_duration.record(
            elapsed.as_secs_f64(),
            &[
                KeyValue::new("http.route", route),
                KeyValue::new("http.request.method", method.to_string()),
                KeyValue::new("http.response.status_code", i64::from(status)),
            ],
        );
    }
}

/// Instruments recorded by the work simulator.
#[derive(Clone)]
pub struct WorkMetrics {
    requests: Counter<u64>,
    simulated_latency: Histogram<f64>,
}

impl WorkMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            requests: meter
                .u64_counter("work.requests")
                .with_description("Completed /work requests by outcome")
                .build(),
            simulated_latency: meter
                .f64_histogram("work.simulated_latency")
                .with_description("Latency injected into /work requests")
                .with_unit("ms")
                .build(),
        }
    }

    pub fn record_outcome(&self, status: u16, latency: Duration) {
        let attributes = [KeyValue::new("http.response.status_code", i64::from(status))];
        self.requests.add(1, &attributes);
        self.simulated_latency
            .record(latency.as_secs_f64() * 1_000.0, &attributes);
    }
}
