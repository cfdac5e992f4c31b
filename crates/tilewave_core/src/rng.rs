//! Random source abstraction for the solver.
//!
//! The grid only needs "pick one of N". Keeping it behind a trait lets tests
//! script the exact draw sequence while normal runs use `StdRng`.
//!
//! Draw sites, in order: seed cell `x`, seed cell `y`, then one draw per
//! collapse. Two runs with the same seed make the same draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random number generator used by [`Grid`](crate::Grid).
pub trait WfcRng {
    /// Returns a random usize in [0, max). Returns 0 when `max == 0`.
    fn next_usize_max(&mut self, max: usize) -> usize;
}

/// Standard Rust RNG wrapper using `rand::rngs::StdRng`.
#[derive(Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Reproducible generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, otherwise from entropy.
    pub fn from_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl WfcRng for StdRandom {
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }
}

/// Replays a fixed list of picks, cycling when exhausted.
///
/// Each pick is reduced modulo the requested bound, so `0` always means "the
/// first option".
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Always picks the first option.
    pub fn first() -> Self {
        Self::new(vec![0])
    }

    fn next_pick(&mut self) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick
    }
}

impl WfcRng for ScriptedRandom {
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.next_pick() % max
    }
}
