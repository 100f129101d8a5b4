//! Cooperative time budgets.
//!
//! Long-running loops hold a [`Ticker`] and call [`Ticker::tick`] once per
//! unit of work. The wall clock is only read every [`CHECK_INTERVAL`] ticks,
//! so the first batch of work always runs even on a zero budget.

use std::time::{Duration, Instant};

/// Number of ticks between two reads of the wall clock.
pub const CHECK_INTERVAL: usize = 256;

/// A point in time after which work should stop.
#[derive(Debug, Copy, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.budget
    }

    /// A deadline starting now that spends `share` of what remains of this
    /// one.
    pub fn share(&self, share: f64) -> Deadline {
        Deadline::after(self.remaining().mul_f64(share.clamp(0.0, 1.0)))
    }

    pub fn ticker(&self) -> Ticker {
        Ticker {
            deadline: *self,
            ticks: 0,
            expired: false,
        }
    }
}

/// Counts units of work against a [`Deadline`]. Once expired it stays
/// expired.
#[derive(Debug, Clone)]
pub struct Ticker {
    deadline: Deadline,
    ticks: usize,
    expired: bool,
}

impl Ticker {
    /// Record one unit of work. Returns `false` once the deadline has passed.
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.ticks += 1;
        if self.ticks % CHECK_INTERVAL == 0 && self.deadline.is_expired() {
            self.expired = true;
        }
        !self.expired
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}
