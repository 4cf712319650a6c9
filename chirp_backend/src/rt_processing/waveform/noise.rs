use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Number of held values per noise period.
pub const NOISE_STEPS: usize = 4;

/// Stepped noise source: four random values held for a quarter period each,
/// redrawn every time the oscillator phase wraps.
///
/// Seeded PCG keeps renders reproducible; the generator never allocates, so
/// refills are safe on the render thread.
#[derive(Debug, Clone)]
pub struct NoiseTable {
    values: [i16; NOISE_STEPS],
    rng: Pcg32,
}

impl NoiseTable {
    pub fn new(seed: u64) -> Self {
        let mut table = Self {
            values: [0; NOISE_STEPS],
            rng: Pcg32::seed_from_u64(seed),
        };
        table.refill();
        table
    }

    #[inline]
    pub fn refill(&mut self) {
        for v in &mut self.values {
            *v = self.rng.r#gen::<i16>();
        }
    }

    #[inline]
    pub fn values(&self) -> &[i16; NOISE_STEPS] {
        &self.values
    }
}
