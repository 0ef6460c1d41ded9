//! Random sources for latency and failure injection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws consumed by the work simulator.
///
/// Every call is an independent draw.
pub trait WorkRng: Send + Sync {
    /// Uniform integer in `[0, bound_ms)`.
    fn millis_below(&self, bound_ms: u64) -> u64;

    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64;
}

/// Thread-local OS-seeded generator; each task draws from its own thread's state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl WorkRng for ThreadRandom {
    fn millis_below(&self, bound_ms: u64) -> u64 {
        rand::thread_rng().gen_range(0..bound_ms)
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for replaying a traffic pattern.
#[derive(Debug)]
pub struct SeededRandom {
    inner: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic while holding the lock cannot leave StdRng half-updated.
        let mut rng = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl WorkRng for SeededRandom {
    fn millis_below(&self, bound_ms: u64) -> u64 {
        self.with_rng(|rng| rng.gen_range(0..bound_ms))
    }

    fn unit(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }
}
