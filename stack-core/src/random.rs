use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded source of jitter values.
///
/// The whole sequence is a function of the seed, so re-initializing with the
/// same seed replays exactly the same values.
#[derive(Clone, Debug)]
pub struct JitterSource {
    rng: StdRng,
}

impl JitterSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Restarts the sequence from `seed`.
    pub fn init(&mut self, seed: u32) {
        self.rng = StdRng::seed_from_u64(u64::from(seed));
    }

    /// Next value in `[-1, 1]`.
    #[inline]
    pub fn next_signed(&mut self) -> f32 {
        self.rng.random_range(-1.0..=1.0)
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new(0)
    }
}
