//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (OTEL_EXPORTER_OTLP_ENDPOINT)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload path
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, read_config, ConfigError, ENDPOINT_ENV};
pub use schema::{ListenerConfig, LogFormat, LoggingConfig, ServiceConfig, TelemetryConfig};
pub use validation::{validate_config, ValidationError};
