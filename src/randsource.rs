use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic pseudo-random stream backing the job generator.
///
/// Seeded once at construction; every draw advances the stream, so two
/// sources built from the same seed produce identical sequences.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Pcg32,
}

impl RandomSource {
    pub fn new(seed: u32) -> Self {
        RandomSource {
            rng: Pcg32::seed_from_u64(seed as u64),
        }
    }

    /// Uniform draw over `[low, high)`. A degenerate range (`low == high`)
    /// yields `low` while still consuming one sample.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let r: f64 = self.rng.gen();
        r * (high - low) + low
    }

    /// Exponential draw with scale `beta` via the inverse CDF. `beta == 0`
    /// yields exactly 0, which disables inter-arrival jitter without
    /// branching out of the stream.
    pub fn exponential(&mut self, beta: f64) -> f64 {
        let u = self.uniform(0.0, 1.0);
        -(1.0 - u).ln() * beta
    }
}
