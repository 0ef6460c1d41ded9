//! Simulated request work.
//!
//! # Data Flow
//! ```text
//! /work handler (root span context)
//!     → simulator.rs: simulate_work span  (sleep [0, 400) ms, latency kept)
//!     → simulator.rs: db_cache_lookup span (sleep [0, 200) ms)
//!     → simulator.rs: outcome draw (< 0.20 fails)
//!     → correlated log record + WorkOutcome (HTTP response)
//! ```
//!
//! Randomness is drawn from a `WorkRng` supplied at construction (rng.rs).

pub mod rng;
pub mod simulator;

pub use rng::{SeededRandom, ThreadRandom, WorkRng};
pub use simulator::{
    WorkOutcome, WorkSimulator, CACHE_LOOKUP_BOUND_MS, FAILURE_RATE, SIMULATE_WORK_BOUND_MS,
};
