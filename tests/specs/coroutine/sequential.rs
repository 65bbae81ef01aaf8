//! Sequential suspension specs
//!
//! Verify a body reads like straight-line code over asynchronous operations.

use crate::prelude::*;

#[test]
fn sequential_operations_complete_in_program_order() {
    let s = Scenario::new();
    let handle = s.spawn("seq", async {
        let a = seq("a", ms(200)).await?;
        // Shorter delay, still observed second
        let b = seq("b", ms(100)).await?;
        Ok::<_, CoError>(vec![a, b])
    });

    handle.ends_in(CoroutineState::Suspended);
    s.run();

    handle.completes_with(json!([["a", "x", "y"], ["b", "x", "y"]]));
    assert_eq!(s.elapsed(), ms(300));
}

#[test]
fn failed_operation_throws_at_the_suspension_point() {
    let s = Scenario::new();
    let handle = s.spawn("catcher", async {
        let cb = callback()?;
        echo(ms(50), "op", true, cb.into_fn())?;
        let outcome = match suspend().await {
            Ok(values) => json!({"ok": values}),
            Err(err) => json!({"caught": err.message(), "in": err.coroutine()}),
        };
        Ok::<_, CoError>(outcome)
    });
    s.run();

    handle.completes_with(json!({"caught": "op failed", "in": "catcher"}));
    assert!(s.errors().is_empty());
}

#[test]
fn uncaught_failure_reaches_the_error_handler() {
    let s = Scenario::new();
    let handle = s.spawn("worker", async {
        seq("a", ms(10)).await?;
        let cb = callback()?;
        echo(ms(10), "b", true, cb.into_fn())?;
        suspend().await?;
        Ok::<_, CoError>("unreachable")
    });
    s.run();

    handle.ends_in(CoroutineState::Failed);
    assert_eq!(
        s.error_messages(),
        vec!["Unhandled exception in coroutine worker: b failed"]
    );
}

#[test]
fn sleep_and_defer_interleave_coroutines() {
    let s = Scenario::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let trace = Rc::clone(&log);
    s.spawn("sleeper", async move {
        trace.borrow_mut().push("sleeper start");
        sleep(ms(50))?.await?;
        trace.borrow_mut().push("sleeper woke");
        Ok::<_, CoError>(())
    });
    let trace = Rc::clone(&log);
    s.spawn("deferrer", async move {
        trace.borrow_mut().push("deferrer start");
        defer()?.await?;
        trace.borrow_mut().push("deferrer resumed");
        Ok::<_, CoError>(())
    });
    s.run();

    assert_eq!(
        *log.borrow(),
        vec![
            "sleeper start",
            "deferrer start",
            "deferrer resumed",
            "sleeper woke"
        ]
    );
    assert_eq!(s.elapsed(), ms(50));
}

#[test]
fn independent_coroutines_progress_concurrently() {
    let s = Scenario::new();
    let handles: Vec<Handle> = (1..=3)
        .map(|i| {
            s.spawn(&format!("worker-{}", i), async move {
                let mut seen = Vec::new();
                for step in 0..2 {
                    let values = seq(&format!("w{}s{}", i, step), ms(100 * i)).await?;
                    seen.push(values[0].clone());
                }
                Ok::<_, CoError>(seen)
            })
        })
        .collect();
    s.run();

    handles[0].completes_with(json!(["w1s0", "w1s1"]));
    handles[1].completes_with(json!(["w2s0", "w2s1"]));
    handles[2].completes_with(json!(["w3s0", "w3s1"]));
    // Wall time is the slowest coroutine, not the sum
    assert_eq!(s.elapsed(), ms(600));
    assert_eq!(s.runtime.live(), 0);
}
