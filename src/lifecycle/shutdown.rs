//! Shutdown coordination.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::observability::Telemetry;

/// Stop signal for the HTTP server.
///
/// `main` triggers it on SIGINT/SIGTERM; `HttpServer::run` holds a receiver and stops
/// accepting connections when it fires, letting in-flight `/work` requests finish.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to hand to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of servers still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Final step before exit: flush spans and metrics, logging rather than failing.
pub async fn drain_telemetry(telemetry: &Telemetry, deadline: Duration) {
    tracing::info!(deadline_secs = deadline.as_secs_f64(), "Flushing telemetry");
    if let Err(error) = telemetry.shutdown(deadline).await {
        tracing::warn!(%error, "Telemetry shutdown incomplete, buffered data may be lost");
    }
}
