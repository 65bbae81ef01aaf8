// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokio-backed host

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use strand_core::{Host, Task, TimerId};
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Host that schedules onto the current tokio [`LocalSet`](tokio::task::LocalSet)
///
/// Timers are local tasks sleeping on tokio's timer wheel, so paused test
/// time applies to them. Every method must be called from inside a
/// `LocalSet`; coroutine bodies are not `Send` and never leave the thread.
/// A delay past the end of tokio's clock yields a timer that never fires.
#[derive(Clone, Default)]
pub struct TokioHost {
    timers: Rc<RefCell<HashMap<TimerId, AbortHandle>>>,
    next_id: Rc<Cell<u64>>,
}

impl TokioHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers scheduled but not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl Host for TokioHost {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get() + 1);
        self.next_id.set(id.0);

        // Measured from now, not from the task's first poll
        let deadline = Instant::now().checked_add(delay);
        let timers = Rc::clone(&self.timers);
        let handle = tokio::task::spawn_local(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            // Cancelled timers were removed already
            let registered = timers.borrow_mut().remove(&id).is_some();
            if registered {
                task();
            }
        });
        self.timers.borrow_mut().insert(id, handle.abort_handle());
        id
    }

    fn cancel(&self, timer: TimerId) {
        let removed = self.timers.borrow_mut().remove(&timer);
        match removed {
            Some(handle) => handle.abort(),
            None => tracing::trace!(%timer, "cancel of unknown timer ignored"),
        }
    }

    fn next_tick(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }
}

#[cfg(test)]
#[path = "tokio_host_tests.rs"]
mod tests;
