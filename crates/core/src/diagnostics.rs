// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Breadcrumbs: a per-coroutine log of the suspension points it passed
//!
//! A coroutine's native call stack is gone every time it suspends, so a
//! failure deep inside a body would otherwise carry only the location where
//! the error was built. When breadcrumbs are enabled, every suspension point
//! appends its label and caller location here, and the engine stitches the
//! log into the error's stack on failure, most recent first. With a stack
//! depth set, only that many of the newest breadcrumbs are kept.

use crate::error::Frame;
use std::collections::VecDeque;
use std::panic::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Breadcrumb {
    pub label: String,
    pub location: &'static Location<'static>,
}

#[derive(Debug, Clone)]
pub(crate) struct BreadcrumbLog {
    coroutine: String,
    capacity: Option<usize>,
    entries: VecDeque<Breadcrumb>,
}

impl BreadcrumbLog {
    pub(crate) fn new(coroutine: impl Into<String>, capacity: Option<usize>) -> Self {
        Self {
            coroutine: coroutine.into(),
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Append a breadcrumb, evicting the oldest once the log is full
    pub(crate) fn record(&mut self, label: impl Into<String>, location: &'static Location<'static>) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(Breadcrumb {
            label: label.into(),
            location,
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Suspension frames, most recent first
    pub(crate) fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.entries.iter().rev().map(|crumb| Frame::Suspension {
            coroutine: self.coroutine.clone(),
            label: crumb.label.clone(),
            location: crumb.location,
        })
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
