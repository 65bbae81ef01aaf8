// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests

use crate::clock::{Clock, FakeClock};
use crate::config::RuntimeConfig;
use crate::error::{CoError, UsageError};
use crate::host::{Host, Reactor};
use crate::id::SequentialIdGen;
use crate::runtime::{current_host, Runtime};
use crate::suspend::Resumption;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub(crate) fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Runtime on a fake-clock reactor that records every unhandled error
pub(crate) struct Harness {
    pub reactor: Rc<Reactor<FakeClock>>,
    pub runtime: Runtime,
    pub errors: Rc<RefCell<Vec<CoError>>>,
    start: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::new().with_breadcrumbs(false))
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let reactor = Rc::new(Reactor::new(FakeClock::new()));
        let runtime =
            Runtime::with_parts(Rc::clone(&reactor), config, SequentialIdGen::default());
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        runtime.set_error_handler(move |err| sink.borrow_mut().push(err));
        let start = reactor.clock().now();
        Self {
            reactor,
            runtime,
            errors,
            start,
        }
    }

    pub fn run(&self) {
        self.reactor.run();
    }

    pub fn run_for(&self, limit: Duration) {
        self.reactor.run_for(limit);
    }

    pub fn elapsed(&self) -> Duration {
        self.reactor.now().duration_since(self.start)
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .borrow()
            .iter()
            .map(|err| err.message().to_string())
            .collect()
    }
}

/// Simulated asynchronous operation: after `delay`, completes `done` with
/// `[input, "x", "y"]`, or with an error when `fail` is set
pub(crate) fn echo_after(
    delay: Duration,
    input: &str,
    fail: bool,
    done: impl FnOnce(Resumption) + 'static,
) -> Result<(), UsageError> {
    let input = input.to_string();
    current_host()?.after(
        delay,
        Box::new(move || {
            if fail {
                done(Err(CoError::new(format!("{} failed", input))));
            } else {
                done(Ok(vec![json!(input), json!("x"), json!("y")]));
            }
        }),
    );
    Ok(())
}
