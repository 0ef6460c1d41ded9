//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer diagnostics)
//!     → /healthz → handlers.rs (constant OK)
//!     → /work    → instrument.rs (root span "work")
//!                → handlers.rs → work::WorkSimulator
//!     → Send to client
//! ```

pub mod handlers;
pub mod instrument;
pub mod server;

pub use instrument::{RouteSpan, RouteSpanLayer};
pub use server::{AppState, HttpServer};
