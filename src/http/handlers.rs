//! Route handlers.

use axum::extract::{Extension, State};

use crate::http::server::AppState;
use crate::observability::RequestTrace;
use crate::work::WorkOutcome;

/// Liveness check. Never traced.
pub async fn healthz() -> &'static str {
    "OK"
}

/// Simulated work under the route span opened by `RouteSpanLayer`.
pub async fn work(
    State(state): State<AppState>,
    Extension(trace): Extension<RequestTrace>,
) -> WorkOutcome {
    state.simulator.handle(trace.context()).await
}
