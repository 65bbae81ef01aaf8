//! Future and join specs
//!
//! Verify parallel operations fan in through `join` in position order.

use crate::prelude::*;

#[test]
fn join_reports_the_number_of_failed_futures() {
    let s = Scenario::new();
    let handle = s.spawn("fan-in", async {
        let a = future()?;
        let b = future()?;
        let c = future()?;
        echo(ms(200), "a", false, a.settler())?;
        echo(ms(300), "b", false, b.settler())?;
        echo(ms(100), "c", true, c.settler())?;

        let failed = join(&[a.clone(), b.clone(), c.clone()])?.await?;
        Ok::<_, CoError>(json!({
            "failed": failed,
            "a": a.data(),
            "b": b.data(),
            "c": c.error().map(|err| err.message().to_string()),
        }))
    });
    s.run();

    handle.completes_with(json!({
        "failed": 1,
        "a": ["a", "x", "y"],
        "b": ["b", "x", "y"],
        "c": "c failed",
    }));
    // Parallel, so the total is the slowest operation
    assert_eq!(s.elapsed(), ms(300));
}

#[test]
fn reset_future_reflects_only_the_latest_attempt() {
    let s = Scenario::new();
    let handle = s.spawn("retry", async {
        let f = future()?;
        let mut attempts = Vec::new();
        for (input, fail) in [("first", false), ("second", true), ("third", false)] {
            f.reset();
            echo(ms(25), input, fail, f.settler())?;
            let failed = join(std::slice::from_ref(&f))?.await?;
            attempts.push(json!([failed, f.data()]));
        }
        Ok::<_, CoError>(attempts)
    });
    s.run();

    handle.completes_with(json!([
        [0, ["first", "x", "y"]],
        [1, []],
        [0, ["third", "x", "y"]],
    ]));
}

#[test]
fn future_timeout_counts_as_a_failure() {
    let s = Scenario::new();
    let handle = s.spawn("bounded-future", async {
        let fast = future_with(ms(100))?;
        let slow = future_with(ms(100))?;
        echo(ms(10), "fast", false, fast.settler())?;
        echo(ms(500), "slow", false, slow.settler())?;

        let failed = join(&[fast.clone(), slow.clone()])?.await?;
        let slow_err = slow.error().map(|err| err.message().to_string());
        Ok::<_, CoError>(json!({"failed": failed, "slow": slow_err}))
    });
    s.run_for(ms(150));

    handle.completes_with(json!({
        "failed": 1,
        "slow": "Future did not settle within 100 ms.",
    }));
}

#[test]
fn futures_settled_before_join_do_not_suspend() {
    let s = Scenario::new();
    let handle = s.spawn("eager", async {
        let f = future()?;
        f.resolve(vec![json!("ready")]);
        let failed = join(&[f.clone()])?.await?;
        Ok::<_, CoError>(json!([failed, f.data()]))
    });

    // Completed during spawn without a reactor turn
    handle.completes_with(json!([0, ["ready"]]));
}
