// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-coroutine options

use crate::error::CoError;
use crate::runtime::ErrorHandler;
use std::rc::Rc;
use std::time::Duration;

/// Options for a single coroutine
///
/// Unset fields fall back to the runtime's [`RuntimeConfig`](crate::RuntimeConfig),
/// then to the process-wide defaults.
#[derive(Clone, Default)]
pub struct Options {
    pub(crate) name: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) stack_trace: Option<bool>,
    pub(crate) stack_depth: Option<usize>,
    pub(crate) error_handler: Option<ErrorHandler>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic name used in logs and error messages
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Coroutine-level deadline. Zero disables any runtime default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Record breadcrumbs at every suspension point
    pub fn with_stack_trace(mut self, enabled: bool) -> Self {
        self.stack_trace = Some(enabled);
        self
    }

    /// Maximum number of lines in a reconstructed trace
    pub fn with_stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = Some(depth);
        self
    }

    pub fn with_error_handler(mut self, handler: impl Fn(CoError) + 'static) -> Self {
        self.error_handler = Some(Rc::new(handler));
        self
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("stack_trace", &self.stack_trace)
            .field("stack_depth", &self.stack_depth)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
