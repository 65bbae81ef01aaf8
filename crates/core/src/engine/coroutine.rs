// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single coroutine and its resume loop

use super::current::{current, CurrentGuard};
use super::CoroutineState;
use crate::defaults;
use crate::diagnostics::BreadcrumbLog;
use crate::error::{Cause, CoError, UsageError};
use crate::future::FutureCell;
use crate::host::{Host, TimerId};
use crate::id::CoroutineId;
use crate::runtime::{ErrorHandler, Shared};
use crate::suspend::Resumption;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe, Location};
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

/// The body of a coroutine, erased to a JSON-valued future
pub(crate) type Body = Pin<Box<dyn std::future::Future<Output = Result<Value, CoError>>>>;

/// Resolved settings a coroutine is created with
pub(crate) struct Settings {
    pub name: String,
    pub timeout: Option<Duration>,
    pub breadcrumbs: bool,
    pub stack_depth: Option<usize>,
    pub error_handler: Option<ErrorHandler>,
}

pub(crate) struct Coroutine {
    id: CoroutineId,
    name: String,
    timeout: Option<Duration>,
    stack_depth: Option<usize>,
    error_handler: Option<ErrorHandler>,
    host: Rc<dyn Host>,
    runtime: Weak<Shared>,
    state: Cell<CoroutineState>,
    body: RefCell<Option<Body>>,
    /// Coroutine-level deadline
    deadline: Cell<Option<TimerId>>,
    /// Timer owned by the live suspension point (sleep, callback timeout)
    suspension_timer: Cell<Option<TimerId>>,
    callback_outstanding: Cell<bool>,
    /// Set while the body is parked on a `Suspend`
    awaiting: Cell<bool>,
    /// Bumped on every delivered resumption
    generation: Cell<u64>,
    inbox: RefCell<Option<Resumption>>,
    context: RefCell<HashMap<String, Value>>,
    breadcrumbs: RefCell<Option<BreadcrumbLog>>,
    futures: RefCell<Vec<Weak<FutureCell>>>,
    outcome: RefCell<Option<Result<Value, CoError>>>,
}

impl Coroutine {
    pub(crate) fn new(
        id: CoroutineId,
        settings: Settings,
        body: Body,
        host: Rc<dyn Host>,
        runtime: Weak<Shared>,
    ) -> Rc<Self> {
        let breadcrumbs = settings
            .breadcrumbs
            .then(|| BreadcrumbLog::new(settings.name.clone(), settings.stack_depth));
        Rc::new(Self {
            id,
            name: settings.name,
            timeout: settings.timeout,
            stack_depth: settings.stack_depth,
            error_handler: settings.error_handler,
            host,
            runtime,
            state: Cell::new(CoroutineState::Created),
            body: RefCell::new(Some(body)),
            deadline: Cell::new(None),
            suspension_timer: Cell::new(None),
            callback_outstanding: Cell::new(false),
            awaiting: Cell::new(false),
            generation: Cell::new(0),
            inbox: RefCell::new(None),
            context: RefCell::new(HashMap::new()),
            breadcrumbs: RefCell::new(breadcrumbs),
            futures: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        })
    }

    pub(crate) fn id(&self) -> &CoroutineId {
        &self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> CoroutineState {
        self.state.get()
    }

    pub(crate) fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    pub(crate) fn output(&self) -> Option<Value> {
        match self.outcome.borrow().as_ref() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn error(&self) -> Option<CoError> {
        match self.outcome.borrow().as_ref() {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn breadcrumb_count(&self) -> Option<usize> {
        self.breadcrumbs.borrow().as_ref().map(BreadcrumbLog::len)
    }

    // ------------------------------------------------------------------
    // Suspension-point support
    // ------------------------------------------------------------------

    /// Token for the suspension point about to be entered
    pub(crate) fn wakeup(self: &Rc<Self>) -> Wakeup {
        Wakeup {
            co: Rc::downgrade(self),
            generation: self.generation.get(),
        }
    }

    pub(crate) fn claim_callback(&self) -> Result<(), UsageError> {
        if self.callback_outstanding.replace(true) {
            return Err(UsageError::CallbackOutstanding {
                coroutine: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn record_breadcrumb(&self, label: &str, location: &'static Location<'static>) {
        if let Some(log) = self.breadcrumbs.borrow_mut().as_mut() {
            log.record(label, location);
        }
    }

    /// Resume the live suspension point with `input` once `delay` elapses
    pub(crate) fn arm_suspension_timer(self: &Rc<Self>, delay: Duration, input: Resumption) {
        let wakeup = self.wakeup();
        let timer = self
            .host
            .after(delay, Box::new(move || wakeup.fire(input)));
        if let Some(previous) = self.suspension_timer.replace(Some(timer)) {
            self.host.cancel(previous);
        }
    }

    fn cancel_suspension_timer(&self) {
        if let Some(timer) = self.suspension_timer.take() {
            self.host.cancel(timer);
        }
    }

    pub(crate) fn track_future(&self, cell: &Rc<FutureCell>) {
        let mut futures = self.futures.borrow_mut();
        futures.retain(|weak| weak.strong_count() > 0);
        futures.push(Rc::downgrade(cell));
    }

    /// Hand the pending resumption to the suspension point, or park
    pub(crate) fn take_input(&self) -> Option<Resumption> {
        let input = self.inbox.borrow_mut().take();
        self.awaiting.set(input.is_none());
        input
    }

    // ------------------------------------------------------------------
    // Ambient context
    // ------------------------------------------------------------------

    pub(crate) fn context_insert(&self, key: String, value: Value) -> Option<Value> {
        self.context.borrow_mut().insert(key, value)
    }

    pub(crate) fn context_get(&self, key: &str) -> Option<Value> {
        self.context.borrow().get(key).cloned()
    }

    pub(crate) fn context_remove(&self, key: &str) -> Option<Value> {
        self.context.borrow_mut().remove(key)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Drive a created coroutine to its first suspension point
    pub(crate) fn start(self: &Rc<Self>) -> Result<(), UsageError> {
        if self.state.get() != CoroutineState::Created {
            return Err(UsageError::AlreadyStarted {
                coroutine: self.name.clone(),
            });
        }
        if let Some(active) = current() {
            return Err(UsageError::Reentrant {
                coroutine: self.name.clone(),
                active: active.name.clone(),
            });
        }

        if let Some(shared) = self.runtime.upgrade() {
            shared.register(Rc::clone(self));
        }
        if let Some(timeout) = self.timeout {
            self.arm_deadline(timeout);
        }
        tracing::debug!(coroutine = %self.name, id = %self.id, "coroutine started");
        self.drive();
        Ok(())
    }

    fn arm_deadline(self: &Rc<Self>, timeout: Duration) {
        let co = Rc::downgrade(self);
        let timer = self.host.after(
            timeout,
            Box::new(move || {
                let Some(co) = co.upgrade() else {
                    return;
                };
                co.deadline.set(None);
                tracing::debug!(coroutine = %co.name, "coroutine deadline elapsed");
                co.resume(Err(CoError::internal(
                    Cause::TimedOut,
                    format!("Coroutine did not finish within {} ms.", timeout.as_millis()),
                )));
            }),
        );
        self.deadline.set(Some(timer));
    }

    /// Inject an interrupt into whatever suspension point is live
    pub(crate) fn interrupt(self: &Rc<Self>) {
        if self.state.get().is_terminal() {
            return;
        }
        tracing::debug!(coroutine = %self.name, "interrupt requested");
        self.resume(Err(CoError::internal(
            Cause::Interrupted,
            format!("Coroutine {} interrupted.", self.name),
        )));
    }

    /// Wake a coroutine parked in a join, bypassing the generation check
    pub(crate) fn wake(self: &Rc<Self>) {
        self.resume(Ok(Vec::new()));
    }

    /// Deliver `input` to the live suspension point and run the body until
    /// it suspends again or finishes
    pub(crate) fn resume(self: &Rc<Self>, input: Resumption) {
        let state = self.state.get();
        if state.is_terminal() {
            tracing::trace!(coroutine = %self.name, "resume after termination ignored");
            return;
        }
        if state == CoroutineState::Created {
            // Only an error can reach a coroutine that never ran
            match input {
                Err(err) => self.fail(err),
                Ok(_) => tracing::debug!(coroutine = %self.name, "resume before start ignored"),
            }
            return;
        }
        if self.inbox.borrow().is_some() {
            tracing::debug!(coroutine = %self.name, "resumption already pending, dropping");
            return;
        }

        self.callback_outstanding.set(false);
        self.cancel_suspension_timer();
        self.generation.set(self.generation.get() + 1);

        let input = input.map_err(|err| self.annotate(err));
        *self.inbox.borrow_mut() = Some(input);

        if state == CoroutineState::Running {
            // Delivered synchronously from inside the body; the next
            // suspension point consumes it without parking
            tracing::debug!(coroutine = %self.name, "buffered re-entrant resumption");
            return;
        }
        self.drive();
    }

    fn annotate(&self, mut err: CoError) -> CoError {
        err.attach_coroutine(&self.name);
        if !err.is_stitched() {
            self.stitch(&mut err);
        }
        err
    }

    fn stitch(&self, err: &mut CoError) {
        let frames: Vec<_> = self
            .breadcrumbs
            .borrow()
            .as_ref()
            .map(|log| log.frames().collect())
            .unwrap_or_default();
        err.stitch(frames, self.stack_depth);
    }

    fn drive(self: &Rc<Self>) {
        let Some(mut body) = self.body.borrow_mut().take() else {
            return;
        };
        let span = tracing::debug_span!("coroutine", name = %self.name);
        let _enter = span.enter();

        self.state.set(CoroutineState::Running);
        self.awaiting.set(false);

        let polled = {
            let _current = CurrentGuard::enter(Rc::clone(self));
            let mut cx = Context::from_waker(Waker::noop());
            panic::catch_unwind(AssertUnwindSafe(|| body.as_mut().poll(&mut cx)))
        };

        match polled {
            Ok(Poll::Pending) => {
                if !self.awaiting.get() {
                    tracing::warn!(
                        coroutine = %self.name,
                        "coroutine parked outside a suspension point and may never resume"
                    );
                }
                *self.body.borrow_mut() = Some(body);
                self.state.set(CoroutineState::Suspended);
                tracing::debug!(generation = self.generation.get(), "coroutine suspended");
            }
            Ok(Poll::Ready(Ok(value))) => {
                drop(body);
                self.complete(value);
            }
            Ok(Poll::Ready(Err(err))) => {
                drop(body);
                self.fail(err);
            }
            Err(payload) => {
                drop(body);
                self.fail(CoError::from_panic(payload.as_ref()));
            }
        }
    }

    fn complete(self: &Rc<Self>, value: Value) {
        self.release(CoroutineState::Completed);
        *self.outcome.borrow_mut() = Some(Ok(value));
        tracing::debug!(coroutine = %self.name, "coroutine completed");
    }

    fn fail(self: &Rc<Self>, mut err: CoError) {
        err.mark_unhandled(&self.name);
        if !err.is_stitched() {
            self.stitch(&mut err);
        }
        let state = if err.is_interrupt() {
            CoroutineState::Cancelled
        } else {
            CoroutineState::Failed
        };
        self.release(state);
        *self.outcome.borrow_mut() = Some(Err(err.clone()));
        tracing::debug!(coroutine = %self.name, %state, "coroutine terminated");
        self.report(err);
    }

    /// Enter a terminal state and let go of everything the coroutine owns
    fn release(self: &Rc<Self>, state: CoroutineState) {
        self.state.set(state);
        if let Some(timer) = self.deadline.take() {
            self.host.cancel(timer);
        }
        self.cancel_suspension_timer();
        for cell in self.futures.take() {
            if let Some(cell) = cell.upgrade() {
                cell.cancel_timer(&*self.host);
            }
        }
        self.callback_outstanding.set(false);
        self.awaiting.set(false);

        // Drop owned state outside of any borrow
        let body = self.body.borrow_mut().take();
        let inbox = self.inbox.borrow_mut().take();
        let context = std::mem::take(&mut *self.context.borrow_mut());
        let breadcrumbs = self.breadcrumbs.borrow_mut().take();
        drop((body, inbox, context, breadcrumbs));

        if let Some(shared) = self.runtime.upgrade() {
            shared.unregister(&self.id);
        }
    }

    fn report(&self, err: CoError) {
        if let Some(handler) = &self.error_handler {
            handler(err);
            return;
        }
        if let Some(handler) = self.runtime.upgrade().and_then(|shared| shared.error_handler()) {
            handler(err);
            return;
        }
        if let Some(handler) = defaults::error_handler() {
            handler(err);
            return;
        }
        tracing::error!(
            coroutine = %self.name,
            cause = %err.cause(),
            "{}",
            err.stack_trace()
        );
    }
}

impl Drop for Coroutine {
    fn drop(&mut self) {
        if let Some(timer) = self.deadline.take() {
            self.host.cancel(timer);
        }
        if let Some(timer) = self.suspension_timer.take() {
            self.host.cancel(timer);
        }
    }
}

/// Generation-tagged resumption capability for one suspension point
///
/// Fires only if the coroutine has not been resumed by any other path since
/// the token was issued.
pub(crate) struct Wakeup {
    co: Weak<Coroutine>,
    generation: u64,
}

impl Wakeup {
    pub(crate) fn fire(self, input: Resumption) {
        let Some(co) = self.co.upgrade() else {
            tracing::trace!("resumption for dropped coroutine ignored");
            return;
        };
        if co.generation.get() != self.generation {
            tracing::debug!(
                coroutine = %co.name,
                issued = self.generation,
                current = co.generation.get(),
                "stale resumption ignored"
            );
            return;
        }
        co.resume(input);
    }
}

impl std::fmt::Debug for Wakeup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.co.upgrade().map(|co| co.name.clone());
        f.debug_struct("Wakeup")
            .field("coroutine", &name)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
#[path = "coroutine_tests.rs"]
mod tests;
