// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strand-core: sequential coroutines over a single-threaded event loop
//!
//! This crate provides:
//! - The suspend/resume engine and its lifecycle state machine
//! - Suspension points: callbacks, sleep, defer
//! - Futures with ordered fan-in (`join`)
//! - Coroutine and suspension deadlines, and interrupts
//! - Breadcrumb traces across suspensions
//! - A `Host` abstraction with a built-in deterministic reactor

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod id;

mod defaults;
mod diagnostics;
mod engine;
mod future;
mod options;
mod runtime;
mod suspend;

#[cfg(test)]
mod testing;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, RuntimeConfig};
pub use defaults::{breadcrumbs_enabled, clear_error_handler, enable_breadcrumbs, set_error_handler};
pub use engine::CoroutineState;
pub use error::{Cause, CoError, Frame, UsageError};
pub use future::{future, future_with, join, Future, Join};
pub use host::{Host, Reactor, Task, TimerId, TimerQueue};
pub use id::{CoroutineId, IdGen, SequentialIdGen, UuidIdGen};
pub use options::Options;
pub use runtime::{current_host, ErrorHandler, Handle, Runtime};
pub use suspend::{
    callback, callback_with, defer, sleep, suspend, Callback, CallbackOptions, Resumption, Suspend,
    Values,
};
