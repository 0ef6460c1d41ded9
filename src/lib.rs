//! OTLP-instrumented sample service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod work;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
