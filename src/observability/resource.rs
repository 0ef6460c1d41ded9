//! Service identity attached to every export.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

use crate::config::TelemetryConfig;

/// Immutable `service.name` / `service.version` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResource {
    service_name: String,
    service_version: String,
}

impl ServiceResource {
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.service_name.clone(), config.service_version.clone())
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    /// SDK resource shared by the tracer and meter providers.
    pub fn to_resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attribute(KeyValue::new("service.version", self.service_version.clone()))
            .build()
    }
}

impl Default for ServiceResource {
    fn default() -> Self {
        Self::from_config(&TelemetryConfig::default())
    }
}
