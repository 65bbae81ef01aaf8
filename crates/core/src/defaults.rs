// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide defaults: the last-resort error handler and breadcrumb flag

use crate::error::CoError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

type GlobalHandler = Arc<dyn Fn(CoError) + Send + Sync>;

static ERROR_HANDLER: RwLock<Option<GlobalHandler>> = RwLock::new(None);
static BREADCRUMBS: AtomicBool = AtomicBool::new(false);

/// Install the handler used by coroutines with neither their own handler
/// nor a runtime handler. Without one, failures are logged at `error`.
pub fn set_error_handler(handler: impl Fn(CoError) + Send + Sync + 'static) {
    let mut slot = ERROR_HANDLER.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(Arc::new(handler));
}

pub fn clear_error_handler() {
    let mut slot = ERROR_HANDLER.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

/// Turn breadcrumbs on for coroutines that do not choose for themselves
pub fn enable_breadcrumbs(enabled: bool) {
    BREADCRUMBS.store(enabled, Ordering::SeqCst);
}

pub fn breadcrumbs_enabled() -> bool {
    BREADCRUMBS.load(Ordering::SeqCst)
}

pub(crate) fn error_handler() -> Option<GlobalHandler> {
    ERROR_HANDLER
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}
