//! The single seeded random source threaded explicitly through every
//! randomized decision the solver makes. No other part of this crate touches
//! `rand::thread_rng` or any other ambient source.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct SolverRng {
    inner: StdRng,
}

impl SolverRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn inner_mut(&mut self) -> &mut StdRng {
        &mut self.inner
    }
}
