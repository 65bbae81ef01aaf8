// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced host wrapper for consistent observability

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use strand_core::{Host, Task, TimerId};

/// Wrapper that adds tracing to any Host
///
/// `elapsed_ms` on "timer fired" is wall-clock time since scheduling. Over a
/// host driven by virtual time, such as a fake-clock reactor, it reads near
/// zero whatever the delay.
#[derive(Clone)]
pub struct TracedHost<H> {
    inner: H,
}

impl<H> TracedHost<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Host> Host for TracedHost<H> {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        let delay_ms = millis(delay);
        let span = tracing::debug_span!("host.after", delay_ms);
        let _guard = span.enter();

        // The id is only known once the inner host hands it back
        let slot: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let fired = Rc::clone(&slot);
        let scheduled_at = Instant::now();
        let wrapped: Task = Box::new(move || {
            let elapsed = scheduled_at.elapsed();
            tracing::debug!(
                timer = ?fired.get(),
                delay_ms,
                elapsed_ms = millis(elapsed),
                "timer fired"
            );
            task();
        });

        let timer = self.inner.after(delay, wrapped);
        slot.set(Some(timer));
        tracing::debug!(%timer, "timer scheduled");
        timer
    }

    fn cancel(&self, timer: TimerId) {
        tracing::debug!(%timer, "timer cancelled");
        self.inner.cancel(timer);
    }

    fn next_tick(&self, task: Task) {
        tracing::trace!("tick queued");
        self.inner.next_tick(Box::new(move || {
            tracing::trace!("tick ran");
            task();
        }));
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
