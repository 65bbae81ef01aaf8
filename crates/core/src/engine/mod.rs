// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suspend/resume engine
//!
//! A coroutine owns a pinned body future and drives it with a no-op waker.
//! The body only ever parks on engine-provided suspension points, so the
//! engine never needs a real waker: whoever holds a resumption token calls
//! [`Coroutine::resume`] directly, which polls the body again.

mod coroutine;
mod current;
mod state;

pub(crate) use coroutine::{Body, Coroutine, Settings, Wakeup};
pub(crate) use current::{current, require};
pub use state::CoroutineState;
