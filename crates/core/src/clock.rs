// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for the reactor's notion of time
//!
//! The reactor never reads time directly. It asks its clock for `now()` and,
//! when idle, asks the clock to wait for the next timer deadline. The system
//! clock really sleeps; the fake clock jumps, which makes timer-driven
//! coroutine tests run instantly and deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source of a [`Reactor`](crate::Reactor)
pub trait Clock: Clone {
    fn now(&self) -> Instant;

    /// Return once `deadline` has been reached.
    fn wait_until(&self, deadline: Instant);
}

/// Wall-clock time; waiting sleeps the thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wait_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

/// Virtual time that only moves when waited on or advanced
///
/// Clones share one timeline.
#[derive(Debug, Clone)]
pub struct FakeClock {
    current: Rc<Cell<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.current.set(self.current.get() + duration);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current.get()
    }

    /// Jumps forward to `deadline`; never moves backwards.
    fn wait_until(&self, deadline: Instant) {
        if deadline > self.current.get() {
            self.current.set(deadline);
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
