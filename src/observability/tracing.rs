//! Trace context handling.
//!
//! # Responsibilities
//! - Extract W3C trace context from incoming request headers
//! - Carry the request's root context from the route layer to handlers
//! - Expose the hex ids of the active span for log correlation

use axum::http::HeaderMap;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::{SpanId, TraceContextExt, TraceId};
use opentelemetry::Context;

/// Root context of one instrumented request, stored in the request extensions.
#[derive(Clone, Debug)]
pub struct RequestTrace(pub Context);

impl RequestTrace {
    pub fn context(&self) -> &Context {
        &self.0
    }

    pub fn ids(&self) -> TraceIds {
        TraceIds::from_context(&self.0)
    }
}

/// Identifiers of the span active in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceIds {
    pub trace_id: TraceId,
    pub span_id: SpanId,
}

impl TraceIds {
    /// Ids of the span carried by `cx`; both are invalid (all zero) when there is none.
    pub fn from_context(cx: &Context) -> Self {
        let span = cx.span();
        let span_context = span.span_context();
        Self {
            trace_id: span_context.trace_id(),
            span_id: span_context.span_id(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }
}

/// Adapter letting a propagator read an axum header map.
pub(crate) struct HeaderExtractor<'a>(pub(crate) &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
