// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for coroutines
//!
//! [`CoError`] is the error that flows through coroutine bodies: it is what a
//! failed callback injects at a suspension point, what deadlines and
//! interrupts deliver, and what reaches the error handler when a body gives up.
//! [`UsageError`] reports protocol misuse synchronously at the offending call.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::Location;
use thiserror::Error;

/// Why a coroutine error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cause {
    /// Body-thrown failure, or a failed asynchronous operation
    Exception,
    /// A coroutine, callback, or future deadline elapsed
    TimedOut,
    /// External cancellation through `Handle::interrupt`
    Interrupted,
}

impl Cause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cause::Exception => "Exception",
            Cause::TimedOut => "TimedOut",
            Cause::Interrupted => "Interrupted",
        }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a reconstructed coroutine trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Where the error value was constructed
    Origin {
        location: &'static Location<'static>,
        /// Set for errors the engine raises on its own behalf
        internal: bool,
    },
    /// A suspension point the coroutine passed through before failing
    Suspension {
        coroutine: String,
        label: String,
        location: &'static Location<'static>,
    },
}

impl Frame {
    pub fn location(&self) -> &'static Location<'static> {
        match self {
            Frame::Origin { location, .. } | Frame::Suspension { location, .. } => location,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Frame::Origin { internal: true, .. })
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Origin { location, .. } => write!(f, "    at {}", location),
            Frame::Suspension {
                coroutine,
                label,
                location,
            } => write!(f, "    {} suspended at {} ({})", coroutine, location, label),
        }
    }
}

/// Error delivered through a coroutine's resumption channel
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CoError {
    message: String,
    cause: Cause,
    coroutine: Option<String>,
    stack: Vec<Frame>,
    stitched: bool,
}

impl CoError {
    /// An `Exception`-caused error originating at the caller
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::build(Cause::Exception, message.into(), false)
    }

    #[track_caller]
    pub fn with_cause(cause: Cause, message: impl Into<String>) -> Self {
        Self::build(cause, message.into(), false)
    }

    #[track_caller]
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::build(Cause::TimedOut, message.into(), false)
    }

    #[track_caller]
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::build(Cause::Interrupted, message.into(), false)
    }

    /// Wrap any error raised by an asynchronous operation
    #[track_caller]
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::build(Cause::Exception, err.to_string(), false)
    }

    /// Raised by the engine itself; its origin frame is dropped from traces.
    #[track_caller]
    pub(crate) fn internal(cause: Cause, message: impl Into<String>) -> Self {
        Self::build(cause, message.into(), true)
    }

    #[track_caller]
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "coroutine body panicked".to_string()
        };
        Self::build(Cause::Exception, format!("panic: {}", message), true)
    }

    #[track_caller]
    fn build(cause: Cause, message: String, internal: bool) -> Self {
        Self {
            message,
            cause,
            coroutine: None,
            stack: vec![Frame::Origin {
                location: Location::caller(),
                internal,
            }],
            stitched: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Cause {
        self.cause
    }

    /// Name of the coroutine the error was delivered to, once known
    pub fn coroutine(&self) -> Option<&str> {
        self.coroutine.as_deref()
    }

    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    pub fn is_timeout(&self) -> bool {
        self.cause == Cause::TimedOut
    }

    pub fn is_interrupt(&self) -> bool {
        self.cause == Cause::Interrupted
    }

    /// Render `<cause>: <message>` followed by one line per frame
    pub fn stack_trace(&self) -> String {
        let mut out = format!("{}: {}", self.cause, self.message);
        for frame in &self.stack {
            out.push('\n');
            out.push_str(&frame.to_string());
        }
        out
    }

    pub(crate) fn attach_coroutine(&mut self, name: &str) {
        if self.coroutine.is_none() {
            self.coroutine = Some(name.to_string());
        }
    }

    pub(crate) fn mark_unhandled(&mut self, name: &str) {
        self.message = format!("Unhandled exception in coroutine {}: {}", name, self.message);
        self.attach_coroutine(name);
    }

    pub(crate) fn is_stitched(&self) -> bool {
        self.stitched
    }

    /// Append suspension frames, drop internal ones, cap at `depth` lines.
    pub(crate) fn stitch(&mut self, frames: impl IntoIterator<Item = Frame>, depth: Option<usize>) {
        self.stack.extend(frames);
        self.stack.retain(|frame| !frame.is_internal());
        if let Some(depth) = depth {
            self.stack.truncate(depth);
        }
        self.stitched = true;
    }
}

impl From<UsageError> for CoError {
    #[track_caller]
    fn from(err: UsageError) -> Self {
        Self::build(Cause::Exception, err.to_string(), false)
    }
}

impl From<serde_json::Error> for CoError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::build(Cause::Exception, format!("invalid coroutine output: {}", err), false)
    }
}

/// Protocol misuse, reported synchronously at the violating call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("{operation}() must be invoked from within an active coroutine")]
    NoActiveCoroutine { operation: &'static str },
    #[error("coroutine {coroutine} already has a live callback outstanding")]
    CallbackOutstanding { coroutine: String },
    #[error("cannot start coroutine {coroutine} while coroutine {active} is executing")]
    Reentrant { coroutine: String, active: String },
    #[error("coroutine {coroutine} has already been started")]
    AlreadyStarted { coroutine: String },
    #[error("cannot join a future owned by another coroutine from {coroutine}")]
    ForeignFuture { coroutine: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
