// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime-wide defaults for coroutines.
//!
//! Per-coroutine [`Options`](crate::Options) override every value here.
//!
//! ```toml
//! default_timeout = "30s"
//! breadcrumbs = true
//! stack_depth = 20
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading a runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML syntax or schema error
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error reading file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Defaults applied to every coroutine a runtime creates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Coroutine-level deadline for coroutines created without one.
    /// Zero means no deadline.
    #[serde(with = "humantime_serde")]
    pub default_timeout: Option<Duration>,
    /// Record breadcrumbs at every suspension point. Unset defers to the
    /// process-wide flag.
    pub breadcrumbs: Option<bool>,
    /// Maximum number of lines kept in a reconstructed trace
    pub stack_depth: Option<usize>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn with_breadcrumbs(mut self, enabled: bool) -> Self {
        self.breadcrumbs = Some(enabled);
        self
    }

    pub fn with_stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = Some(depth);
        self
    }

    /// Parse a configuration from TOML string content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The configured deadline, with zero treated as none
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.default_timeout.filter(|t| !t.is_zero())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
