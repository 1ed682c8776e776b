//! Seedable confidence jitter.
//!
//! Detector confidences carry a small perturbation so equally-sized
//! clusters don't all report the same flat number. The perturbation comes
//! from a seeded generator so runs are reproducible; tests that want exact
//! values use [`NoJitter`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Strategy for perturbing a confidence value in [0, 1].
pub trait Jitter: Send + Sync {
    fn apply(&self, base: f64) -> f64;
}

/// Deterministic jitter from a seeded PRNG.
pub struct SeededJitter {
    rng: Mutex<StdRng>,
    amplitude: f64,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            amplitude: 0.05,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }
}

impl Jitter for SeededJitter {
    fn apply(&self, base: f64) -> f64 {
        let mut rng = self.rng.lock().unwrap();
        let delta = rng.gen_range(-self.amplitude..=self.amplitude);
        (base + delta).clamp(0.0, 1.0)
    }
}

/// Identity strategy: confidence values pass through untouched.
pub struct NoJitter;

impl Jitter for NoJitter {
    fn apply(&self, base: f64) -> f64 {
        base
    }
}
