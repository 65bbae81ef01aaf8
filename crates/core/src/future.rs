// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Futures and ordered fan-in
//!
//! A [`Future`] is a settle-once result cell a coroutine hands to an
//! asynchronous operation instead of suspending on it. Many can be in
//! flight at once; [`join`] then waits for them in order and reports how
//! many failed. Settling a future never throws into the coroutine; it only
//! wakes the coroutine when a join is currently waiting on that future.

use crate::engine::{self, Coroutine};
use crate::error::{Cause, CoError, UsageError};
use crate::host::{Host, TimerId};
use crate::suspend::{Resumption, Suspend, Values};
use std::cell::{Cell, RefCell};
use std::panic::Location;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

pub(crate) struct FutureCell {
    done: Cell<bool>,
    data: RefCell<Values>,
    error: RefCell<Option<CoError>>,
    joined: Cell<bool>,
    timeout: Option<Duration>,
    timer: Cell<Option<TimerId>>,
    owner: Weak<Coroutine>,
}

impl FutureCell {
    pub(crate) fn cancel_timer(&self, host: &dyn Host) {
        if let Some(timer) = self.timer.take() {
            host.cancel(timer);
        }
    }
}

impl Drop for FutureCell {
    fn drop(&mut self) {
        if let Some(co) = self.owner.upgrade() {
            self.cancel_timer(&**co.host());
        }
    }
}

/// Settle-once result holder bound to the coroutine that created it
///
/// Clones share the same cell.
#[derive(Clone)]
pub struct Future {
    cell: Rc<FutureCell>,
}

impl Future {
    fn arm(&self, host: &dyn Host) {
        let Some(timeout) = self.cell.timeout else {
            return;
        };
        let cell = Rc::downgrade(&self.cell);
        let timer = host.after(
            timeout,
            Box::new(move || {
                let Some(cell) = cell.upgrade() else {
                    return;
                };
                cell.timer.set(None);
                Future { cell }.settle(Err(CoError::internal(
                    Cause::TimedOut,
                    format!("Future did not settle within {} ms.", timeout.as_millis()),
                )));
            }),
        );
        self.cell.timer.set(Some(timer));
    }

    /// Record the outcome; only the first settlement counts
    pub fn settle(&self, result: Resumption) {
        let cell = &self.cell;
        let owner = cell.owner.upgrade();
        if cell.done.get() {
            tracing::debug!(
                coroutine = owner.as_ref().map(|co| co.name()),
                "late future settlement discarded"
            );
            return;
        }

        cell.done.set(true);
        match result {
            Ok(values) => *cell.data.borrow_mut() = values,
            Err(mut err) => {
                if let Some(co) = &owner {
                    err.attach_coroutine(co.name());
                }
                *cell.error.borrow_mut() = Some(err);
            }
        }

        let Some(co) = owner else {
            return;
        };
        cell.cancel_timer(&**co.host());
        tracing::debug!(coroutine = %co.name(), joined = cell.joined.get(), "future settled");
        if cell.joined.get() {
            co.wake();
        }
    }

    pub fn resolve(&self, values: Values) {
        self.settle(Ok(values));
    }

    pub fn reject(&self, error: CoError) {
        self.settle(Err(error));
    }

    /// Adapt the future to a callback-taking API
    pub fn settler(&self) -> impl FnOnce(Resumption) + 'static {
        let future = self.clone();
        move |result| future.settle(result)
    }

    pub fn is_done(&self) -> bool {
        self.cell.done.get()
    }

    /// Values of a successful settlement, empty otherwise
    pub fn data(&self) -> Values {
        self.cell.data.borrow().clone()
    }

    pub fn error(&self) -> Option<CoError> {
        self.cell.error.borrow().clone()
    }

    /// Clear the outcome for another attempt, re-arming the deadline
    pub fn reset(&self) {
        let cell = &self.cell;
        cell.done.set(false);
        cell.data.borrow_mut().clear();
        *cell.error.borrow_mut() = None;

        let Some(co) = cell.owner.upgrade() else {
            return;
        };
        cell.cancel_timer(&**co.host());
        if !co.state().is_terminal() {
            self.arm(&**co.host());
        }
    }

    fn is_owned_by(&self, co: &Rc<Coroutine>) -> bool {
        self.cell.owner.as_ptr() == Rc::as_ptr(co)
    }
}

impl std::fmt::Debug for Future {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Future")
            .field("done", &self.cell.done.get())
            .field("data", &self.cell.data.borrow())
            .field("error", &self.cell.error.borrow())
            .field("joined", &self.cell.joined.get())
            .finish()
    }
}

/// Create a future bound to the current coroutine
#[track_caller]
pub fn future() -> Result<Future, UsageError> {
    create(None, Location::caller())
}

/// Create a future that settles itself with a `TimedOut` error after `timeout`
#[track_caller]
pub fn future_with(timeout: Duration) -> Result<Future, UsageError> {
    create(Some(timeout).filter(|t| !t.is_zero()), Location::caller())
}

fn create(
    timeout: Option<Duration>,
    location: &'static Location<'static>,
) -> Result<Future, UsageError> {
    let co = engine::require("future")?;
    co.record_breadcrumb("future", location);

    let cell = Rc::new(FutureCell {
        done: Cell::new(false),
        data: RefCell::new(Vec::new()),
        error: RefCell::new(None),
        joined: Cell::new(false),
        timeout,
        timer: Cell::new(None),
        owner: Rc::downgrade(&co),
    });
    co.track_future(&cell);

    let future = Future { cell };
    future.arm(&**co.host());
    Ok(future)
}

/// Wait for `futures` in order, yielding how many settled with an error
///
/// Errors of individual futures are counted, never thrown. A coroutine
/// deadline or interrupt arriving while the join waits is thrown out of it.
///
/// ```ignore
/// let a = future()?;
/// let b = future()?;
/// start_fetch("a", a.settler());
/// start_fetch("b", b.settler());
/// let failed = join(&[a.clone(), b.clone()])?.await?;
/// ```
#[track_caller]
pub fn join(futures: &[Future]) -> Result<Join, UsageError> {
    let co = engine::require("join")?;
    if !futures.iter().all(|f| f.is_owned_by(&co)) {
        return Err(UsageError::ForeignFuture {
            coroutine: co.name().to_string(),
        });
    }
    co.record_breadcrumb("join", Location::caller());
    Ok(Join {
        futures: futures.to_vec(),
        position: 0,
        marked: None,
    })
}

/// Ordered fan-in returned by [`join`]
#[derive(Debug)]
#[must_use = "a join does nothing unless awaited"]
pub struct Join {
    futures: Vec<Future>,
    position: usize,
    marked: Option<usize>,
}

impl Join {
    fn mark(&mut self, position: usize) {
        if self.marked != Some(position) {
            self.unmark();
            self.futures[position].cell.joined.set(true);
            self.marked = Some(position);
        }
    }

    fn unmark(&mut self) {
        if let Some(position) = self.marked.take() {
            self.futures[position].cell.joined.set(false);
        }
    }
}

impl std::future::Future for Join {
    type Output = Result<usize, CoError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        loop {
            while this
                .futures
                .get(this.position)
                .is_some_and(Future::is_done)
            {
                this.position += 1;
            }
            if this.position == this.futures.len() {
                this.unmark();
                let failed = this.futures.iter().filter(|f| f.error().is_some()).count();
                return Poll::Ready(Ok(failed));
            }

            this.mark(this.position);
            match std::future::Future::poll(Pin::new(&mut Suspend::new()), cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(_)) => continue,
                Poll::Ready(Err(err)) => {
                    this.unmark();
                    return Poll::Ready(Err(err));
                }
            }
        }
    }
}

impl Drop for Join {
    fn drop(&mut self) {
        self.unmark();
    }
}

#[cfg(test)]
#[path = "future_tests.rs"]
mod tests;
