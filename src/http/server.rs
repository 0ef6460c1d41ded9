//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with both routes
//! - Wrap `/work` in its route span and panic guard
//! - Wire up diagnostic request tracing
//! - Serve until the shutdown signal, then drain in-flight requests

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::http::handlers;
use crate::http::instrument::RouteSpanLayer;
use crate::observability::{CorrelatedLogger, Telemetry};
use crate::work::{WorkRng, WorkSimulator};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<WorkSimulator>,
}

/// HTTP server for the sample service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server logging request records to stdout.
    pub fn new(telemetry: Arc<Telemetry>, rng: Arc<dyn WorkRng>) -> Self {
        Self::with_logger(telemetry, rng, CorrelatedLogger::stdout())
    }

    pub fn with_logger(telemetry: Arc<Telemetry>, rng: Arc<dyn WorkRng>, logger: CorrelatedLogger) -> Self {
        let simulator = Arc::new(WorkSimulator::new(Arc::clone(&telemetry), rng, logger));
        let state = AppState { simulator };

        Self {
            router: Self::build_router(telemetry, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(telemetry: Arc<Telemetry>, state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route(
                "/work",
                get(handlers::work).layer(
                    ServiceBuilder::new()
                        .layer(RouteSpanLayer::new("work", telemetry))
                        .layer(CatchPanicLayer::new()),
                ),
            )
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
