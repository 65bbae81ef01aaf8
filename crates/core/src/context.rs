// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-coroutine ambient storage
//!
//! Values live on the coroutine, not the thread: each coroutine sees only
//! what it stored itself, and everything is dropped when it terminates.

use crate::engine;
use crate::error::UsageError;
use serde_json::Value;

/// Store `value` under `key`, returning the previous value
pub fn insert(key: impl Into<String>, value: Value) -> Result<Option<Value>, UsageError> {
    let co = engine::require("context::insert")?;
    Ok(co.context_insert(key.into(), value))
}

pub fn get(key: &str) -> Result<Option<Value>, UsageError> {
    let co = engine::require("context::get")?;
    Ok(co.context_get(key))
}

pub fn remove(key: &str) -> Result<Option<Value>, UsageError> {
    let co = engine::require("context::remove")?;
    Ok(co.context_remove(key))
}
