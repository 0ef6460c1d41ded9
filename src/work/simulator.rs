//! The `/work` request pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use opentelemetry::trace::{Span, Tracer};
use opentelemetry::Context;
use serde_json::Value;

use crate::observability::{CorrelatedLogger, Severity, Telemetry, TraceIds};
use crate::work::rng::WorkRng;

/// Upper bound (exclusive) of the latency injected by `simulate_work`.
pub const SIMULATE_WORK_BOUND_MS: u64 = 400;
/// Upper bound (exclusive) of the `db_cache_lookup` delay.
pub const CACHE_LOOKUP_BOUND_MS: u64 = 200;
/// Probability that a request ends in an injected failure.
pub const FAILURE_RATE: f64 = 0.20;

pub const SUCCESS_BODY: &str = "Work completed\n";
pub const FAILURE_BODY: &str = "Internal Server Error";

/// Result of one simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkOutcome {
    pub status: StatusCode,
    pub body: &'static str,
    /// Latency injected by the `simulate_work` step.
    pub latency: Duration,
}

impl WorkOutcome {
    pub fn is_failure(&self) -> bool {
        self.status.is_server_error()
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}

impl IntoResponse for WorkOutcome {
    fn into_response(self) -> Response {
        (self.status, self.body).into_response()
    }
}

/// Whether an outcome draw in `[0, 1)` selects the failure branch.
pub fn is_failure_draw(draw: f64) -> bool {
    draw < FAILURE_RATE
}

/// Latency/failure injector for `/work`.
pub struct WorkSimulator {
    telemetry: Arc<Telemetry>,
    rng: Arc<dyn WorkRng>,
    logger: CorrelatedLogger,
}

impl WorkSimulator {
    pub fn new(telemetry: Arc<Telemetry>, rng: Arc<dyn WorkRng>, logger: CorrelatedLogger) -> Self {
        Self {
            telemetry,
            rng,
            logger,
        }
    }

    /// Run the simulated work under the request span carried by `cx`.
    ///
    /// Emits exactly one correlated log record, tagged with the ids of the span in `cx`.
    pub async fn handle(&self, cx: &Context) -> WorkOutcome {
        let log = self.logger.for_ids(TraceIds::from_context(cx));

        let latency = self
            .sleep_in_span("simulate_work", SIMULATE_WORK_BOUND_MS, cx)
            .await;
        self.sleep_in_span("db_cache_lookup", CACHE_LOOKUP_BOUND_MS, cx)
            .await;

        let outcome = if is_failure_draw(self.rng.unit()) {
            WorkOutcome {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: FAILURE_BODY,
                latency,
            }
        } else {
            WorkOutcome {
                status: StatusCode::OK,
                body: SUCCESS_BODY,
                latency,
            }
        };

        let attributes = [
            ("latency_ms", Value::from(outcome.latency_ms())),
            ("status", Value::from(outcome.status.as_u16())),
        ];
        if outcome.is_failure() {
            log.log(Severity::Error, "request failed", attributes);
        } else {
            log.log(Severity::Info, "request succeeded", attributes);
        }

        self.telemetry
            .work_metrics()
            .record_outcome(outcome.status.as_u16(), latency);

        outcome
    }

    /// Child span of `cx` that stays open for a random delay below `bound_ms`.
    async fn sleep_in_span(&self, name: &'static str, bound_ms: u64, cx: &Context) -> Duration {
        let delay = Duration::from_millis(self.rng.millis_below(bound_ms));

        let mut span = self.telemetry.tracer().start_with_context(name, cx);
        tokio::time::sleep(delay).await;
        span.end();

        delay
    }
}
