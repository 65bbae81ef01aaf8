// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in single-threaded event loop

use super::{Host, Task, TimerId, TimerQueue};
use crate::clock::{Clock, SystemClock};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Single-threaded event loop: a next-tick queue plus a timer queue
///
/// Each [`turn`](Reactor::turn) first runs the batch of next-tick tasks that
/// were queued before the turn began (tasks queued while the batch runs wait
/// for the following turn), then fires every timer that is due. When there is
/// nothing runnable, [`run`](Reactor::run) idles on the clock until the next
/// deadline, so a [`FakeClock`](crate::FakeClock) turns waiting into an
/// instant jump of virtual time.
pub struct Reactor<C: Clock = SystemClock> {
    clock: C,
    timers: RefCell<TimerQueue>,
    ticks: RefCell<VecDeque<Task>>,
}

impl Default for Reactor<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Reactor<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            timers: RefCell::new(TimerQueue::new()),
            ticks: RefCell::new(VecDeque::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Number of queued next-tick tasks and pending timers
    pub fn pending(&self) -> usize {
        self.ticks.borrow().len() + self.timers.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Run one turn of the loop, returning how many tasks ran
    pub fn turn(&self) -> usize {
        let batch: Vec<Task> = self.ticks.borrow_mut().drain(..).collect();
        let mut ran = batch.len();
        for task in batch {
            task();
        }

        let now = self.clock.now();
        loop {
            // Pop one at a time so a firing timer can cancel a sibling
            let due = self.timers.borrow_mut().pop_due(now);
            let Some((id, task)) = due else {
                break;
            };
            tracing::trace!(timer = %id, "timer fired");
            task();
            ran += 1;
        }
        ran
    }

    /// Run until no next-tick task or timer remains
    pub fn run(&self) {
        loop {
            self.turn();
            if !self.ticks.borrow().is_empty() {
                continue;
            }
            let next = self.timers.borrow_mut().next_fire_time();
            match next {
                Some(deadline) => self.clock.wait_until(deadline),
                None => break,
            }
        }
    }

    /// Run until idle or until `limit` has elapsed on the reactor's clock
    pub fn run_for(&self, limit: Duration) {
        let Some(stop_at) = self.clock.now().checked_add(limit) else {
            return self.run();
        };
        loop {
            self.turn();
            if !self.ticks.borrow().is_empty() {
                continue;
            }
            let next = self.timers.borrow_mut().next_fire_time();
            match next {
                Some(deadline) if deadline <= stop_at => self.clock.wait_until(deadline),
                Some(_) => {
                    self.clock.wait_until(stop_at);
                    break;
                }
                None => break,
            }
        }
    }
}

impl<C: Clock> Host for Reactor<C> {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        match self.clock.now().checked_add(delay) {
            Some(fire_at) => self.timers.borrow_mut().schedule(fire_at, task),
            None => {
                tracing::trace!(?delay, "timer deadline out of range, never fires");
                self.timers.borrow_mut().park(task)
            }
        }
    }

    fn cancel(&self, timer: TimerId) {
        // Drop the task outside the borrow; it may own a coroutine
        let task = self.timers.borrow_mut().cancel(timer);
        drop(task);
    }

    fn next_tick(&self, task: Task) {
        self.ticks.borrow_mut().push_back(task);
    }
}

#[cfg(test)]
#[path = "reactor_tests.rs"]
mod tests;
