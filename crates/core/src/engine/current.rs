// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ambient pointer to the coroutine whose body is executing on this thread

use super::Coroutine;
use crate::error::UsageError;
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static CURRENT: RefCell<Option<Rc<Coroutine>>> = const { RefCell::new(None) };
}

/// Makes a coroutine current until dropped, then restores the previous one
///
/// Restoration happens in `Drop`, so it also runs when the body panics.
pub(crate) struct CurrentGuard {
    previous: Option<Rc<Coroutine>>,
}

impl CurrentGuard {
    pub(crate) fn enter(co: Rc<Coroutine>) -> Self {
        let previous = CURRENT.with(|current| current.replace(Some(co)));
        Self { previous }
    }
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let _ = CURRENT.try_with(|current| current.replace(previous));
    }
}

/// The coroutine currently executing, if any
pub(crate) fn current() -> Option<Rc<Coroutine>> {
    CURRENT.try_with(|current| current.borrow().clone()).ok().flatten()
}

/// The coroutine currently executing, or a usage error naming `operation`
pub(crate) fn require(operation: &'static str) -> Result<Rc<Coroutine>, UsageError> {
    current().ok_or(UsageError::NoActiveCoroutine { operation })
}
