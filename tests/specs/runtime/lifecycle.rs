//! Runtime and handle lifecycle specs

use crate::prelude::*;

#[test]
fn created_coroutine_waits_for_start() {
    let s = Scenario::new();
    let handle = s.runtime.create(
        async { Ok::<_, CoError>("ran") },
        Options::new().named("lazy"),
    );

    handle.ends_in(CoroutineState::Created);
    handle.start().unwrap();
    handle.completes_with(json!("ran"));

    assert_eq!(
        handle.start().unwrap_err(),
        UsageError::AlreadyStarted {
            coroutine: "lazy".to_string()
        }
    );
}

#[test]
fn unnamed_coroutines_get_a_generated_name() {
    let s = Scenario::new();
    let handle = s.spawn_with(async { Ok::<_, CoError>(()) }, Options::new());
    assert_eq!(handle.name(), format!("coroutine-{}", handle.id()));
}

#[test]
fn primitives_outside_a_coroutine_are_usage_errors() {
    let err = callback().unwrap_err();
    assert_eq!(
        err.to_string(),
        "callback() must be invoked from within an active coroutine"
    );
    assert!(sleep(ms(1)).is_err());
    assert!(future().is_err());
    assert!(context::get("key").is_err());
}

#[test]
fn second_callback_before_the_first_fires_is_rejected() {
    let s = Scenario::new();
    let handle = s.spawn("greedy", async {
        let _first = callback()?;
        let second = callback().map(|_| ()).unwrap_err();
        Ok::<_, CoError>(second.to_string())
    });

    handle.completes_with(json!(
        "coroutine greedy already has a live callback outstanding"
    ));
}

#[test]
fn context_values_belong_to_their_coroutine() {
    let s = Scenario::new();
    let handles: Vec<Handle> = ["alpha", "beta"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            s.spawn(name, async move {
                context::insert("request", json!(name))?;
                sleep(ms(10 * (2 - i as u64)))?.await?;
                Ok::<_, CoError>(context::get("request")?)
            })
        })
        .collect();
    s.run();

    handles[0].completes_with(json!("alpha"));
    handles[1].completes_with(json!("beta"));
}

#[test]
fn config_loads_from_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strand.toml");
    std::fs::write(&path, "default_timeout = \"2s\"\nstack_depth = 8\n").unwrap();

    let config = RuntimeConfig::load(&path).unwrap();
    assert_eq!(config.default_timeout, Some(Duration::from_secs(2)));
    assert_eq!(config.stack_depth, Some(8));
    assert_eq!(config.breadcrumbs, None);
}
