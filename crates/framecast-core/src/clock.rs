//! Monotonic time, injected rather than read from `Instant::now()`
//! directly, so the pipeline's timing-dependent behavior (jitter
//! dwell, NACK backoff, reorder age-out) can be driven deterministically
//! in tests. See spec §9's clock-as-interface redesign note.

use std::cell::Cell;
use std::time::Instant;

pub type Millis = u64;

pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wraps `Instant` so `now_ms()` is relative to the clock's construction
/// rather than an arbitrary platform epoch.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.epoch.elapsed().as_millis() as Millis
    }
}

/// A clock a test advances by hand. Single-threaded by design, matching
/// the crate's no-locks concurrency model.
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Millis>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
