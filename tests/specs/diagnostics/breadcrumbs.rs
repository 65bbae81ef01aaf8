//! Breadcrumb trace specs
//!
//! Verify an unhandled error carries the suspension points it passed through.

use crate::prelude::*;

fn suspension_labels(err: &CoError) -> Vec<String> {
    err.stack()
        .iter()
        .filter_map(|frame| match frame {
            Frame::Suspension { label, .. } => Some(label.clone()),
            Frame::Origin { .. } => None,
        })
        .collect()
}

#[test]
fn unhandled_error_lists_suspensions_most_recent_first() {
    let s = Scenario::new();
    s.spawn_with(
        async {
            sleep(ms(5))?.await?;
            let cb = callback_with(CallbackOptions::new().with_label("lookup"))?;
            echo(ms(5), "lookup", false, cb.into_fn())?;
            suspend().await?;
            Err::<(), _>(CoError::new("gave up"))
        },
        Options::new().named("traced").with_stack_trace(true),
    );
    s.run();

    let err = &s.errors()[0];
    assert_eq!(suspension_labels(err), vec!["lookup", "sleep"]);

    let trace = err.stack_trace();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(
        lines[0],
        "Exception: Unhandled exception in coroutine traced: gave up"
    );
    assert!(lines[1].contains("breadcrumbs.rs"), "origin line: {}", lines[1]);
    assert!(lines[2].contains("traced suspended at"), "frame line: {}", lines[2]);
    assert!(lines[2].ends_with("(lookup)"), "frame line: {}", lines[2]);
}

#[test]
fn breadcrumbs_are_off_unless_requested() {
    let s = Scenario::new();
    s.spawn("quiet", async {
        sleep(ms(5))?.await?;
        Err::<(), _>(CoError::new("gave up"))
    });
    s.run();

    assert!(suspension_labels(&s.errors()[0]).is_empty());
}

#[test]
fn config_enables_breadcrumbs_with_a_depth_cap() {
    let config = RuntimeConfig::from_toml_str("breadcrumbs = true\nstack_depth = 2\n").unwrap();
    let s = Scenario::with_config(config);
    s.spawn("deep", async {
        for _ in 0..5 {
            sleep(ms(1))?.await?;
        }
        Err::<(), _>(CoError::new("gave up"))
    });
    s.run();

    assert_eq!(s.errors()[0].stack().len(), 2);
}

#[test]
fn timeout_trace_omits_the_engine_origin() {
    let s = Scenario::new();
    s.spawn_with(
        async {
            sleep(ms(500))?.await?;
            Ok::<_, CoError>(())
        },
        Options::new().named("slow").with_stack_trace(true).with_timeout(ms(5)),
    );
    s.run();

    let err = &s.errors()[0];
    assert_eq!(err.cause(), Cause::TimedOut);
    assert_eq!(suspension_labels(err), vec!["sleep"]);
    assert!(err.stack().iter().all(|frame| !frame.is_internal()));
}
