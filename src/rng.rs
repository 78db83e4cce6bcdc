//! Random outcome sources for game resolution.
//!
//! Every draw that decides a game outcome goes through the [`OutcomeSource`]
//! trait so that production code can use the system generator while tests
//! inject a seeded or scripted source. The odds tables themselves stay pure
//! functions of the drawn values.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Supplier of uniform random draws.
///
/// Implementations must be safe to share across concurrent play requests.
pub trait OutcomeSource: Send + Sync {
    /// Uniform draw from `[0, bound)`.
    fn roll_below(&self, bound: u32) -> u32;

    /// Uniform draw from `[0, 1)`.
    fn roll_unit(&self) -> f64;
}

/// Production source backed by the thread-local system generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOutcomes;

impl OutcomeSource for SystemOutcomes {
    fn roll_below(&self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }

    fn roll_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic source seeded once, for reproducible simulations.
pub struct SeededOutcomes {
    rng: Mutex<StdRng>,
}

impl SeededOutcomes {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OutcomeSource for SeededOutcomes {
    fn roll_below(&self, bound: u32) -> u32 {
        self.rng.lock().expect("rng lock poisoned").gen_range(0..bound)
    }

    fn roll_unit(&self) -> f64 {
        self.rng.lock().expect("rng lock poisoned").gen::<f64>()
    }
}

/// Plays back a fixed queue of draws, for tests that force specific
/// outcomes. Falls back to zero when the script runs dry so a miscounted
/// script fails loudly in assertions rather than panicking mid-play.
#[derive(Default)]
pub struct ScriptedOutcomes {
    ints: Mutex<VecDeque<u32>>,
    units: Mutex<VecDeque<f64>>,
}

impl ScriptedOutcomes {
    pub fn new(ints: Vec<u32>, units: Vec<f64>) -> Self {
        Self {
            ints: Mutex::new(ints.into()),
            units: Mutex::new(units.into()),
        }
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn roll_below(&self, bound: u32) -> u32 {
        let drawn = self
            .ints
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(0);
        drawn.min(bound.saturating_sub(1))
    }

    fn roll_unit(&self) -> f64 {
        self.units
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(0.0)
    }
}
