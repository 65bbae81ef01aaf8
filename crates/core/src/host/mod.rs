// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host primitives the engine schedules its resumptions on
//!
//! A host offers exactly what a single-threaded event loop offers: run a task
//! after a delay (cancellable), and run a task on the next tick. The built-in
//! [`Reactor`] is one such host; other event loops plug in by implementing
//! [`Host`].

mod reactor;
mod timers;

pub use reactor::Reactor;
pub use timers::TimerQueue;

use std::rc::Rc;
use std::time::Duration;

/// Deferred unit of work run by a host
pub type Task = Box<dyn FnOnce()>;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Timer and next-tick primitives of a single-threaded event loop
pub trait Host {
    /// Run `task` once `delay` has elapsed
    fn after(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending timer. Unknown or already-fired timers are ignored.
    fn cancel(&self, timer: TimerId);

    /// Run `task` after everything already queued for the next tick
    fn next_tick(&self, task: Task);
}

impl<H: Host + ?Sized> Host for Rc<H> {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        (**self).after(delay, task)
    }

    fn cancel(&self, timer: TimerId) {
        (**self).cancel(timer)
    }

    fn next_tick(&self, task: Task) {
        (**self).next_tick(task)
    }
}
