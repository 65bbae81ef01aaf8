//! Tokio host specs
//!
//! The same coroutine code runs unchanged on a tokio `LocalSet`.

use crate::prelude::*;
use strand_adapters::{FakeHost, HostCall, TokioHost, TracedHost};
use tokio::task::LocalSet;

#[tokio::test(start_paused = true)]
async fn sequential_operations_run_on_tokio() {
    LocalSet::new()
        .run_until(async {
            let runtime = Runtime::new(TracedHost::new(TokioHost::new()));
            let started = tokio::time::Instant::now();
            let handle = runtime
                .spawn(
                    async {
                        let a = seq("a", ms(200)).await?;
                        let b = seq("b", ms(100)).await?;
                        Ok::<_, CoError>(vec![a, b])
                    },
                    Options::new().named("on-tokio"),
                )
                .unwrap();

            while !handle.is_terminated() {
                tokio::time::sleep(ms(5)).await;
            }

            handle.completes_with(json!([["a", "x", "y"], ["b", "x", "y"]]));
            assert!(started.elapsed() >= ms(300));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn interrupt_on_tokio_cancels_the_pending_timer() {
    LocalSet::new()
        .run_until(async {
            let host = TokioHost::new();
            let runtime = Runtime::new(host.clone());
            runtime.set_error_handler(|_| {});
            let handle = runtime
                .spawn(
                    async {
                        sleep(ms(10_000))?.await?;
                        Ok::<_, CoError>(())
                    },
                    Options::new(),
                )
                .unwrap();
            assert_eq!(host.pending(), 1);

            handle.interrupt();
            handle.ends_in(CoroutineState::Cancelled);
            assert_eq!(host.pending(), 0);
        })
        .await;
}

#[test]
fn fake_host_steps_a_coroutine_by_hand() {
    let host = FakeHost::new();
    let runtime = Runtime::new(host.clone());
    let handle = runtime
        .spawn(
            async {
                let first = seq("a", ms(200)).await?;
                defer()?.await?;
                Ok::<_, CoError>(first)
            },
            Options::new(),
        )
        .unwrap();

    let timer = match host.calls()[0] {
        HostCall::After { timer, delay } => {
            assert_eq!(delay, ms(200));
            timer
        }
        ref other => panic!("unexpected call: {:?}", other),
    };
    assert!(host.fire(timer));
    handle.ends_in(CoroutineState::Suspended);

    assert_eq!(host.run_ticks(), 1);
    handle.completes_with(json!(["a", "x", "y"]));
}
