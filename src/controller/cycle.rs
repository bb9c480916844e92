//! Randomized cycle durations

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{CycleConfig, CycleDraw};

/// Source of cycle durations for the toggling activity.
///
/// Draws uniformly from the configured inclusive range. With
/// [`CycleDraw::Once`] the first draw is reused for every cycle.
#[derive(Debug)]
pub struct CycleClock {
    rng: StdRng,
    min_ms: u64,
    max_ms: u64,
    draw: CycleDraw,
    fixed: Option<Duration>,
}

impl CycleClock {
    /// Creates a clock from the cycle config. A `seed` makes the sequence of
    /// durations reproducible.
    #[must_use]
    pub fn new(config: &CycleConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng,
            min_ms: config.min_ms,
            max_ms: config.max_ms,
            draw: config.draw,
            fixed: None,
        }
    }

    /// Returns the duration of the next cycle.
    pub fn next_cycle(&mut self) -> Duration {
        if let Some(fixed) = self.fixed {
            return fixed;
        }
        let ms = self.rng.random_range(self.min_ms..=self.max_ms);
        let cycle = Duration::from_millis(ms);
        if self.draw == CycleDraw::Once {
            self.fixed = Some(cycle);
        }
        cycle
    }
}
