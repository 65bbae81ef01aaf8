// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coroutine identity and id generation

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Unique identifier for a coroutine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoroutineId(pub String);

impl std::fmt::Display for CoroutineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CoroutineId {
    fn from(s: String) -> Self {
        CoroutineId(s)
    }
}

impl From<&str> for CoroutineId {
    fn from(s: &str) -> Self {
        CoroutineId(s.to_string())
    }
}

/// Source of coroutine ids for a runtime
pub trait IdGen {
    fn next_id(&self) -> CoroutineId;
}

/// Random v4 UUIDs; the runtime default
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_id(&self) -> CoroutineId {
        CoroutineId(uuid::Uuid::new_v4().to_string())
    }
}

/// `<prefix>-1`, `<prefix>-2`, ...; clones continue the same sequence
#[derive(Debug, Clone)]
pub struct SequentialIdGen {
    prefix: Rc<str>,
    issued: Rc<Cell<u64>>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Rc::from(prefix.into()),
            issued: Rc::new(Cell::new(0)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("co")
    }
}

impl IdGen for SequentialIdGen {
    fn next_id(&self) -> CoroutineId {
        let n = self.issued.get() + 1;
        self.issued.set(n);
        CoroutineId(format!("{}-{}", self.prefix, n))
    }
}
