//! Configuration validation.
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("telemetry.collector_endpoint must not be empty")]
    EmptyEndpoint,

    #[error("telemetry.{0} must be greater than zero")]
    Zero(&'static str),

    #[error("telemetry.batch_max_export_batch_size ({batch}) exceeds batch_max_queue_size ({queue})")]
    BatchLargerThanQueue { batch: usize, queue: usize },
}

/// Semantic checks serde cannot express.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let telemetry = &config.telemetry;
    if telemetry.collector_endpoint.trim().is_empty() {
        errors.push(ValidationError::EmptyEndpoint);
    }
    if telemetry.metric_export_interval_secs == 0 {
        errors.push(ValidationError::Zero("metric_export_interval_secs"));
    }
    if telemetry.batch_max_queue_size == 0 {
        errors.push(ValidationError::Zero("batch_max_queue_size"));
    }
    if telemetry.batch_max_export_batch_size == 0 {
        errors.push(ValidationError::Zero("batch_max_export_batch_size"));
    }
    if telemetry.batch_max_export_batch_size > telemetry.batch_max_queue_size {
        errors.push(ValidationError::BatchLargerThanQueue {
            batch: telemetry.batch_max_export_batch_size,
            queue: telemetry.batch_max_queue_size,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
