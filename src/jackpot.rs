//! Shared jackpot pool.
//!
//! The pool is process-wide state touched by every Saw spin across all
//! users, so both mutations are single atomic instructions: tax
//! contributions are a `fetch_add`, and a winning draw's read-and-reset is
//! a `swap`. Two concurrent winners can therefore never both observe the
//! pre-reset value — the second swap sees the base value the first one
//! installed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global jackpot pool with an atomic read-and-reset payout.
#[derive(Debug)]
pub struct JackpotPool {
    value: AtomicU64,
    base_value: u64,
}

impl JackpotPool {
    /// Create a pool seeded at its base value.
    pub fn new(base_value: u64) -> Self {
        Self {
            value: AtomicU64::new(base_value),
            base_value,
        }
    }

    /// Current pool value. Read-only; polled by the presentation layer.
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Add a spin tax contribution to the pool. Commutative with any
    /// number of concurrent contributions.
    pub fn add_tax(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::SeqCst);
    }

    /// Resolve a jackpot-trigger draw.
    ///
    /// On a winning draw the pool is reset to its base value and the
    /// pre-reset value is returned as the payout, in one indivisible
    /// step. A losing draw returns `None` and leaves the pool untouched.
    pub fn try_payout(&self, winner_draw: bool) -> Option<u64> {
        if !winner_draw {
            return None;
        }
        Some(self.value.swap(self.base_value, Ordering::SeqCst))
    }
}
