// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coroutine lifecycle state

use serde::{Deserialize, Serialize};

/// Where a coroutine is in its lifecycle
///
/// `Created → Running → Suspended → Running → … → {Completed | Failed | Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoroutineState {
    /// Created but not yet started
    Created,
    /// Body is executing
    Running,
    /// Parked at a suspension point
    Suspended,
    /// Body returned a value
    Completed,
    /// Body gave up with an uncaught error
    Failed,
    /// Body gave up after an interrupt
    Cancelled,
}

impl CoroutineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CoroutineState::Completed | CoroutineState::Failed | CoroutineState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoroutineState::Created => "created",
            CoroutineState::Running => "running",
            CoroutineState::Suspended => "suspended",
            CoroutineState::Completed => "completed",
            CoroutineState::Failed => "failed",
            CoroutineState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CoroutineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
