//! Per-route server spans.
//!
//! # Responsibilities
//! - Start a root `SpanKind::Server` span named after the route for every call
//! - Parent it on an incoming W3C trace context when one is present
//! - Expose the span's context to handlers through `RequestTrace`
//! - Record status code and error state, end the span, record request duration
//!
//! # Design Decisions
//! - Implemented as a tower `Layer` so it wraps any axum `MethodRouter`
//! - The wrapped call is spawned, so it always runs to completion even when the
//!   client goes away mid-request; there is no disconnect short-circuit
//! - Panics in the wrapped handler become a 500 before reaching this layer
//!   (`CatchPanicLayer` sits inside it), so the span is always closed with a status

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use axum::http::{Request, Response};
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::KeyValue;
use tower::{Layer, Service};

use crate::observability::{RequestTrace, Telemetry};

/// Layer producing [`RouteSpan`] services for one named route.
#[derive(Clone)]
pub struct RouteSpanLayer {
    route: &'static str,
    telemetry: Arc<Telemetry>,
}

impl RouteSpanLayer {
    pub fn new(route: &'static str, telemetry: Arc<Telemetry>) -> Self {
        Self { route, telemetry }
    }
}

impl<S> Layer<S> for RouteSpanLayer {
    type Service = RouteSpan<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RouteSpan {
            inner,
            route: self.route,
            telemetry: Arc::clone(&self.telemetry),
        }
    }
}

/// Service running its inner service inside a route span.
#[derive(Clone)]
pub struct RouteSpan<S> {
    inner: S,
    route: &'static str,
    telemetry: Arc<Telemetry>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RouteSpan<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let started = Instant::now();
        let route = self.route;
        let telemetry = Arc::clone(&self.telemetry);
        let method = request.method().to_string();

        let parent = telemetry.extract_parent(request.headers());
        let tracer = telemetry.tracer();
        let span = tracer
            .span_builder(route)
            .with_kind(SpanKind::Server)
            .with_attributes([
                KeyValue::new("http.request.method", method.clone()),
                KeyValue::new("url.path", request.uri().path().to_string()),
                KeyValue::new("http.route", format!("/{route}")),
            ])
            .start_with_context(tracer, &parent);
        let cx = parent.with_span(span);
        request.extensions_mut().insert(RequestTrace(cx.clone()));

        // The clone may not be ready; swap so the instance that was polled serves this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        // Runs on its own task: a client that disconnects drops only the JoinHandle,
        // never the work, its log record or its span.
        let task = tokio::spawn(async move {
            let result = inner.call(request).await;

            let span = cx.span();
            let status = match &result {
                Ok(response) => {
                    let status = response.status();
                    span.set_attribute(KeyValue::new(
                        "http.response.status_code",
                        i64::from(status.as_u16()),
                    ));
                    if status.is_server_error() {
                        span.set_status(Status::error(status.to_string()));
                    }
                    status.as_u16()
                }
                Err(_) => {
                    span.set_status(Status::error("handler error"));
                    500
                }
            };
            span.end();

            telemetry
                .http_metrics()
                .record_request(route, &method, status, started.elapsed());

            result
        });

        Box::pin(async move {
            match task.await {
                Ok(result) => result,
                Err(join) => {
                    let payload = join
                        .try_into_panic()
                        .unwrap_or_else(|join| -> Box<dyn Any + Send> { Box::new(join.to_string()) });
                    std::panic::resume_unwind(payload)
                }
            }
        })
    }
}
