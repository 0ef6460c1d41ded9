//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Collector address used when neither the file nor the environment names one.
pub const DEFAULT_COLLECTOR_ENDPOINT: &str = "otel-collector:4317";

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Telemetry pipeline settings.
    pub telemetry: TelemetryConfig,

    /// Process diagnostics settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// OTLP export and resource identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute.
    pub service_name: String,

    /// `service.version` resource attribute.
    pub service_version: String,

    /// OTLP/gRPC collector address. A bare `host:port` is dialled in plaintext.
    pub collector_endpoint: String,

    /// Periodic metric reader interval in seconds.
    pub metric_export_interval_secs: u64,

    /// Batch span processor flush delay in milliseconds.
    pub batch_scheduled_delay_ms: u64,

    /// Spans buffered before new ones are dropped.
    pub batch_max_queue_size: usize,

    /// Upper bound on spans sent in one export call.
    pub batch_max_export_batch_size: usize,

    /// Deadline for draining both pipelines at shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl TelemetryConfig {
    pub fn metric_export_interval(&self) -> Duration {
        Duration::from_secs(self.metric_export_interval_secs)
    }

    pub fn batch_scheduled_delay(&self) -> Duration {
        Duration::from_millis(self.batch_scheduled_delay_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sample-app".to_string(),
            service_version: "1.0.0".to_string(),
            collector_endpoint: DEFAULT_COLLECTOR_ENDPOINT.to_string(),
            metric_export_interval_secs: 60,
            batch_scheduled_delay_ms: 5_000,
            batch_max_queue_size: 2_048,
            batch_max_export_batch_size: 512,
            shutdown_timeout_secs: 5,
        }
    }
}

/// Output encoding for process diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Process diagnostics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Diagnostic output format.
    pub format: LogFormat,

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: "sample_app=info,tower_http=info".to_string(),
        }
    }
}
