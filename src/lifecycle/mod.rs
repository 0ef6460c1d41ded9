//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Telemetry pipelines → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Stop accepting → Drain requests → Flush telemetry within deadline → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: telemetry before listener, so no request is served untraced
//! - Telemetry flush is the last step before exit and is bounded by a deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{drain_telemetry, Shutdown};
pub use signals::wait_for_signal;
pub use startup::{bootstrap, Bootstrapped, StartupError};
