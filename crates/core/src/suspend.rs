// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suspension points
//!
//! Each primitive binds itself to the coroutine whose body is executing and
//! fails with [`UsageError::NoActiveCoroutine`] anywhere else. A body parks
//! by awaiting a [`Suspend`]; whatever resumes the coroutine next (a
//! callback, a timer, an interrupt) becomes the output of that await.

use crate::engine::{self, Wakeup};
use crate::error::{Cause, CoError, UsageError};
use serde_json::Value;
use std::panic::Location;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Values carried by a successful resumption
pub type Values = Vec<Value>;

/// What a suspension point yields: values, or the error injected into it
pub type Resumption = Result<Values, CoError>;

/// The await point of a coroutine body
///
/// Resolves immediately when a resumption was delivered while the body was
/// still running, otherwise parks the coroutine until one arrives.
#[derive(Debug)]
#[must_use = "a suspension point does nothing unless awaited"]
pub struct Suspend {
    _private: (),
}

impl Suspend {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

impl std::future::Future for Suspend {
    type Output = Resumption;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(co) = engine::current() else {
            return Poll::Ready(Err(UsageError::NoActiveCoroutine {
                operation: "suspend",
            }
            .into()));
        };
        match co.take_input() {
            Some(input) => Poll::Ready(input),
            None => Poll::Pending,
        }
    }
}

/// Await the next resumption of the current coroutine
pub fn suspend() -> Suspend {
    Suspend::new()
}

/// Options for [`callback_with`]
#[derive(Debug, Clone, Default)]
pub struct CallbackOptions {
    /// Resume with a `TimedOut` error if the callback has not fired by then
    pub timeout: Option<Duration>,
    /// Breadcrumb label; defaults to `callback`
    pub label: Option<String>,
}

impl CallbackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Single-use resumption token for a bare callback suspension
///
/// Firing it after the coroutine was resumed by another path (timeout,
/// interrupt) or after the coroutine terminated does nothing.
#[derive(Debug)]
pub struct Callback {
    wakeup: Wakeup,
}

impl Callback {
    /// Resume the coroutine with `result`
    pub fn call(self, result: Resumption) {
        self.wakeup.fire(result);
    }

    pub fn resolve(self, values: Values) {
        self.call(Ok(values));
    }

    /// Throw `error` at the coroutine's suspension point
    pub fn reject(self, error: CoError) {
        self.call(Err(error));
    }

    /// Adapt the token to a callback-taking API
    pub fn into_fn(self) -> impl FnOnce(Resumption) + 'static {
        move |result| self.call(result)
    }
}

/// Request a resumption token for the current coroutine
#[track_caller]
pub fn callback() -> Result<Callback, UsageError> {
    callback_with(CallbackOptions::default())
}

/// Request a resumption token, optionally with its own deadline
#[track_caller]
pub fn callback_with(options: CallbackOptions) -> Result<Callback, UsageError> {
    let co = engine::require("callback")?;
    co.claim_callback()?;

    let label = options.label.as_deref().unwrap_or("callback");
    co.record_breadcrumb(label, Location::caller());

    if let Some(timeout) = options.timeout.filter(|t| !t.is_zero()) {
        let err = CoError::internal(
            Cause::TimedOut,
            format!(
                "Callback {} did not complete within {} ms.",
                label,
                timeout.as_millis()
            ),
        );
        co.arm_suspension_timer(timeout, Err(err));
    }
    tracing::debug!(coroutine = %co.name(), label, "callback issued");

    Ok(Callback {
        wakeup: co.wakeup(),
    })
}

/// Park the current coroutine for `duration` without blocking the host
///
/// ```ignore
/// sleep(Duration::from_millis(50))?.await?;
/// ```
#[track_caller]
pub fn sleep(duration: Duration) -> Result<Suspend, UsageError> {
    let co = engine::require("sleep")?;
    co.record_breadcrumb("sleep", Location::caller());
    co.arm_suspension_timer(duration, Ok(Vec::new()));
    Ok(Suspend::new())
}

/// Yield to the host, resuming after everything already queued for its next tick
#[track_caller]
pub fn defer() -> Result<Suspend, UsageError> {
    let co = engine::require("defer")?;
    co.record_breadcrumb("defer", Location::caller());
    let wakeup = co.wakeup();
    co.host()
        .next_tick(Box::new(move || wakeup.fire(Ok(Vec::new()))));
    Ok(Suspend::new())
}

#[cfg(test)]
#[path = "suspend_tests.rs"]
mod tests;
