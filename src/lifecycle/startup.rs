//! Startup orchestration.
//!
//! Any startup error is fatal: the process must not serve traffic with a
//! half-initialized telemetry pipeline.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{ConfigError, ServiceConfig};
use crate::lifecycle::shutdown::drain_telemetry;
use crate::observability::{ServiceResource, Telemetry, TelemetryError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything `main` needs to start serving.
pub struct Bootstrapped {
    pub telemetry: Arc<Telemetry>,
    pub listener: TcpListener,
}

/// Build the telemetry pipelines, then bind the listener.
pub async fn bootstrap(config: &ServiceConfig) -> Result<Bootstrapped, StartupError> {
    let resource = ServiceResource::from_config(&config.telemetry);
    let telemetry = Arc::new(Telemetry::init(&resource, &config.telemetry)?);

    let address = config.listener.bind_address.clone();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(source) => {
            drain_telemetry(&telemetry, config.telemetry.shutdown_timeout()).await;
            return Err(StartupError::Bind { address, source });
        }
    };

    tracing::info!(address = %address, "Listener bound");
    Ok(Bootstrapped { telemetry, listener })
}
