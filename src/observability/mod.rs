//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main
//!     → resource.rs   (service identity, built once)
//!     → provider.rs   (Telemetry: OTLP exporters, batch processor, periodic reader)
//!     → Arc<Telemetry> handed to the HTTP server
//!
//! per request:
//!     → tracing.rs    (parent extraction, trace/span ids of the active context)
//!     → metrics.rs    (request counters and histograms)
//!     → correlated.rs (one JSON record on stdout, joined to the trace by id)
//!
//! process diagnostics:
//!     → logging.rs    (tracing-subscriber, stderr)
//! ```
//!
//! # Design Decisions
//! - Nothing is installed as an OpenTelemetry global; the `Telemetry` value is passed explicitly
//! - Request records go to stdout, diagnostics to stderr
//! - Export failures stay inside the SDK and never reach the request path

pub mod correlated;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod resource;
pub mod tracing;

pub use correlated::{CorrelatedLogger, LogRecord, LoggerHandle, Severity};
pub use provider::{Telemetry, TelemetryError};
pub use resource::ServiceResource;
pub use self::tracing::{RequestTrace, TraceIds};
