// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake host for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;
use strand_core::{Host, Task, TimerId};

/// Recorded host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    After { timer: TimerId, delay: Duration },
    Cancel { timer: TimerId },
    NextTick,
}

struct PendingTimer {
    delay: Duration,
    task: Task,
}

/// Host whose timers only fire when a test says so
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct FakeHost {
    timers: Rc<RefCell<BTreeMap<TimerId, PendingTimer>>>,
    ticks: Rc<RefCell<VecDeque<Task>>>,
    calls: Rc<RefCell<Vec<HostCall>>>,
    next_id: Rc<Cell<u64>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Pending timers with their requested delays, in scheduling order
    pub fn pending_timers(&self) -> Vec<(TimerId, Duration)> {
        self.timers
            .borrow()
            .iter()
            .map(|(id, timer)| (*id, timer.delay))
            .collect()
    }

    pub fn pending_ticks(&self) -> usize {
        self.ticks.borrow().len()
    }

    /// Fire one timer; false if it is unknown, fired, or cancelled
    pub fn fire(&self, timer: TimerId) -> bool {
        let removed = self.timers.borrow_mut().remove(&timer);
        match removed {
            Some(pending) => {
                (pending.task)();
                true
            }
            None => false,
        }
    }

    /// Fire the pending timer with the shortest delay, oldest first on ties
    pub fn fire_next(&self) -> Option<TimerId> {
        let next = self
            .timers
            .borrow()
            .iter()
            .min_by_key(|(id, timer)| (timer.delay, **id))
            .map(|(id, _)| *id)?;
        self.fire(next);
        Some(next)
    }

    /// Run queued next-tick tasks, including ones they queue
    pub fn run_ticks(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.ticks.borrow_mut().pop_front();
            let Some(task) = task else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl Host for FakeHost {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        let timer = TimerId(self.next_id.get() + 1);
        self.next_id.set(timer.0);
        self.timers
            .borrow_mut()
            .insert(timer, PendingTimer { delay, task });
        self.calls
            .borrow_mut()
            .push(HostCall::After { timer, delay });
        timer
    }

    fn cancel(&self, timer: TimerId) {
        let removed = self.timers.borrow_mut().remove(&timer);
        self.calls.borrow_mut().push(HostCall::Cancel { timer });
        drop(removed);
    }

    fn next_tick(&self, task: Task) {
        self.ticks.borrow_mut().push_back(task);
        self.calls.borrow_mut().push(HostCall::NextTick);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
