// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime: creates coroutines on a host and keeps the live ones alive
//!
//! A coroutine suspended on a timer is referenced only weakly by that timer,
//! so the runtime holds every started coroutine until it terminates.
//! Dropping the last [`Runtime`] clone abandons whatever is still running.

use crate::config::RuntimeConfig;
use crate::defaults;
use crate::engine::{self, Body, Coroutine, CoroutineState, Settings};
use crate::error::{CoError, UsageError};
use crate::host::Host;
use crate::id::{CoroutineId, IdGen, UuidIdGen};
use crate::options::Options;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Receives errors that escaped a coroutine body
pub type ErrorHandler = Rc<dyn Fn(CoError)>;

pub(crate) struct Shared {
    host: Rc<dyn Host>,
    config: RuntimeConfig,
    id_gen: Box<dyn IdGen>,
    error_handler: RefCell<Option<ErrorHandler>>,
    live: RefCell<HashMap<CoroutineId, Rc<Coroutine>>>,
}

impl Shared {
    pub(crate) fn register(&self, co: Rc<Coroutine>) {
        self.live.borrow_mut().insert(co.id().clone(), co);
    }

    pub(crate) fn unregister(&self, id: &CoroutineId) {
        let removed = self.live.borrow_mut().remove(id);
        drop(removed);
    }

    pub(crate) fn error_handler(&self) -> Option<ErrorHandler> {
        self.error_handler.borrow().clone()
    }
}

/// Factory and owner of coroutines running on one host
#[derive(Clone)]
pub struct Runtime {
    shared: Rc<Shared>,
}

impl Runtime {
    pub fn new(host: impl Host + 'static) -> Self {
        Self::with_config(host, RuntimeConfig::default())
    }

    pub fn with_config(host: impl Host + 'static, config: RuntimeConfig) -> Self {
        Self::with_parts(host, config, UuidIdGen)
    }

    pub fn with_parts(
        host: impl Host + 'static,
        config: RuntimeConfig,
        id_gen: impl IdGen + 'static,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                host: Rc::new(host),
                config,
                id_gen: Box::new(id_gen),
                error_handler: RefCell::new(None),
                live: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    pub fn host(&self) -> Rc<dyn Host> {
        Rc::clone(&self.shared.host)
    }

    /// Handler for coroutines created without their own
    pub fn set_error_handler(&self, handler: impl Fn(CoError) + 'static) {
        *self.shared.error_handler.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn clear_error_handler(&self) {
        *self.shared.error_handler.borrow_mut() = None;
    }

    /// Number of started coroutines that have not terminated
    pub fn live(&self) -> usize {
        self.shared.live.borrow().len()
    }

    /// Create a coroutine without running it; see [`Handle::start`]
    pub fn create<F, T>(&self, body: F, options: Options) -> Handle
    where
        F: std::future::Future<Output = Result<T, CoError>> + 'static,
        T: Serialize + 'static,
    {
        let id = self.shared.id_gen.next_id();
        let config = &self.shared.config;
        let settings = Settings {
            name: options
                .name
                .unwrap_or_else(|| format!("coroutine-{}", id)),
            timeout: match options.timeout {
                Some(timeout) => Some(timeout).filter(|t| !t.is_zero()),
                None => config.timeout(),
            },
            breadcrumbs: options
                .stack_trace
                .or(config.breadcrumbs)
                .unwrap_or_else(defaults::breadcrumbs_enabled),
            stack_depth: options.stack_depth.or(config.stack_depth),
            error_handler: options.error_handler,
        };
        tracing::debug!(coroutine = %settings.name, %id, "coroutine created");

        let body: Body = Box::pin(async move {
            let value = body.await?;
            Ok(serde_json::to_value(value)?)
        });
        let co = Coroutine::new(
            id,
            settings,
            body,
            Rc::clone(&self.shared.host),
            Rc::downgrade(&self.shared),
        );
        Handle { co }
    }

    /// Create a coroutine and drive it to its first suspension point
    pub fn spawn<F, T>(&self, body: F, options: Options) -> Result<Handle, UsageError>
    where
        F: std::future::Future<Output = Result<T, CoError>> + 'static,
        T: Serialize + 'static,
    {
        let handle = self.create(body, options);
        handle.start()?;
        Ok(handle)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.shared.config)
            .field("live", &self.live())
            .finish()
    }
}

/// Handle to a coroutine
#[derive(Clone)]
pub struct Handle {
    co: Rc<Coroutine>,
}

impl Handle {
    pub fn id(&self) -> &CoroutineId {
        self.co.id()
    }

    pub fn name(&self) -> &str {
        self.co.name()
    }

    pub fn state(&self) -> CoroutineState {
        self.co.state()
    }

    pub fn is_terminated(&self) -> bool {
        self.co.state().is_terminal()
    }

    /// Value the body returned, once completed
    pub fn output(&self) -> Option<Value> {
        self.co.output()
    }

    /// Error the coroutine terminated with
    pub fn error(&self) -> Option<CoError> {
        self.co.error()
    }

    pub fn start(&self) -> Result<(), UsageError> {
        self.co.start()
    }

    /// Throw an `Interrupted` error at the live suspension point
    ///
    /// The body may catch it and carry on. A coroutine that was never
    /// started is cancelled outright.
    pub fn interrupt(&self) {
        self.co.interrupt();
    }

    #[cfg(test)]
    pub(crate) fn coroutine(&self) -> &Rc<Coroutine> {
        &self.co
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("id", self.co.id())
            .field("name", &self.co.name())
            .field("state", &self.co.state())
            .finish()
    }
}

/// Host of the current coroutine, for scheduling work from inside a body
pub fn current_host() -> Result<Rc<dyn Host>, UsageError> {
    let co = engine::require("current_host")?;
    Ok(Rc::clone(co.host()))
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
