//! Deadline specs
//!
//! Verify coroutine and callback deadlines throw `TimedOut` at the live
//! suspension point and that late completions are ignored.

use crate::prelude::*;

#[test]
fn coroutine_timeout_interrupts_a_long_operation() {
    let s = Scenario::new();
    let handle = s.spawn_with(
        async {
            match seq("slow", ms(2000)).await {
                Ok(_) => Ok::<_, CoError>(json!("finished")),
                Err(err) => Ok(json!({"cause": err.cause(), "message": err.message()})),
            }
        },
        Options::new().named("bounded").with_timeout(ms(10)),
    );

    s.run_for(ms(20));
    handle.completes_with(json!({
        "cause": "TimedOut",
        "message": "Coroutine did not finish within 10 ms.",
    }));

    // The 2000ms completion arrives later and changes nothing
    s.run();
    assert_eq!(s.elapsed(), ms(2000));
    handle.ends_in(CoroutineState::Completed);
}

#[test]
fn callback_timeout_names_the_label() {
    let s = Scenario::new();
    let handle = s.spawn("caller", async {
        let cb = callback_with(
            CallbackOptions::new()
                .with_timeout(ms(75))
                .with_label("fetch"),
        )?;
        echo(ms(500), "late", false, cb.into_fn())?;
        let err = suspend().await.unwrap_err();
        Ok::<_, CoError>(json!({"cause": err.cause(), "message": err.message()}))
    });
    s.run();

    handle.completes_with(json!({
        "cause": "TimedOut",
        "message": "Callback fetch did not complete within 75 ms.",
    }));
}

#[test]
fn config_timeout_applies_to_every_coroutine() {
    let config = RuntimeConfig::from_toml_str(
        r#"
default_timeout = "50ms"
breadcrumbs = false
"#,
    )
    .unwrap();
    let s = Scenario::with_config(config);

    let bounded = s.spawn("bounded", async {
        sleep(ms(100))?.await?;
        Ok::<_, CoError>(())
    });
    let unbounded = s.spawn_with(
        async {
            sleep(ms(100))?.await?;
            Ok::<_, CoError>(())
        },
        Options::new().named("unbounded").with_timeout(Duration::ZERO),
    );
    s.run();

    bounded.ends_in(CoroutineState::Failed);
    unbounded.ends_in(CoroutineState::Completed);
    assert!(s.errors()[0].is_timeout());
}

#[test]
fn config_timeout_beyond_the_clock_range_never_fires() {
    let config = RuntimeConfig::from_toml_str(
        r#"
default_timeout = "500000000000years"
breadcrumbs = false
"#,
    )
    .unwrap();
    let s = Scenario::with_config(config);

    let handle = s.spawn("patient", async {
        sleep(ms(100))?.await?;
        Ok::<_, CoError>("done")
    });
    s.run();

    handle.completes_with(json!("done"));
    assert_eq!(s.elapsed(), ms(100));
    assert!(s.errors().is_empty());
}
