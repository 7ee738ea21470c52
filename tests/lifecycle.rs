//! End-to-end lifecycle properties with controllable adapters.

use std::sync::Arc;
use std::time::{Duration, Instant};

use server_lifecycle::{Manager, Shutdown};

mod common;
use common::MockAdapter;

#[tokio::test]
async fn stop_returns_ok_and_stops_every_adapter() {
    let a = Arc::new(MockAdapter::new("svc-a"));
    let b = Arc::new(MockAdapter::new("svc-b"));

    let manager = Arc::new(
        Manager::builder()
            .adapter(a.clone())
            .adapter(b.clone())
            .build(),
    );

    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(Duration::from_secs(2), manager.stop())
        .await
        .expect("stop should complete within the grace period")
        .expect("orderly stop is not an error");

    let outcome = runner.await.unwrap();
    assert!(outcome.is_ok(), "orderly stop must not surface as an error");
    assert_eq!(a.stop_calls(), 1);
    assert_eq!(b.stop_calls(), 1);
    assert!(a.finished() && b.finished());
}

#[tokio::test]
async fn stop_with_zero_adapters_unblocks_run() {
    let manager = Arc::new(Manager::builder().build());

    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    manager.stop().await.expect("stop of empty group succeeds");
    let outcome = tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("run should return once stopped")
        .unwrap();
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn first_failure_names_the_adapter_and_stops_the_rest() {
    let bad = Arc::new(MockAdapter::failing("svc-bad"));
    let good = Arc::new(MockAdapter::new("svc-good").with_drain(Duration::from_millis(200)));

    let manager = Manager::builder()
        .adapter(bad.clone())
        .adapter(good.clone())
        .build();

    let err = tokio::time::timeout(Duration::from_secs(2), manager.run())
        .await
        .expect("run should return after the failure")
        .expect_err("the failure must surface");

    assert_eq!(err.endpoint(), Some("svc-bad"));
    assert!(!err.is_termination());
    // run returned only after the surviving adapter finished its drain.
    assert_eq!(good.stop_calls(), 1);
    assert!(good.finished());
}

#[tokio::test]
async fn stop_after_a_failure_returns_ok() {
    let bad = Arc::new(MockAdapter::failing("svc-bad"));
    let good = Arc::new(MockAdapter::new("svc-good"));

    let manager = Manager::builder()
        .adapter(bad.clone())
        .adapter(good.clone())
        .build();

    let err = manager.run().await.expect_err("the failure must surface");
    assert_eq!(err.endpoint(), Some("svc-bad"));

    // The failure was run's to report; stopping afterwards is a no-op.
    let stopped = tokio::time::timeout(Duration::from_secs(2), manager.stop())
        .await
        .expect("stop after failure must not block");
    assert!(stopped.is_ok(), "got {stopped:?}");
}

#[tokio::test]
async fn external_shutdown_token_stops_the_group() {
    let a = Arc::new(MockAdapter::new("svc-a"));
    let shutdown = Shutdown::new();

    let manager = Arc::new(
        Manager::builder()
            .adapter(a.clone())
            .span(tracing::info_span!("injected"))
            .shutdown(shutdown.clone())
            .build(),
    );

    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Triggering the injected token from outside is equivalent to stop().
    shutdown.trigger();

    let outcome = tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("run should return once the injected token triggers")
        .unwrap();
    assert!(outcome.is_ok());
    assert_eq!(a.stop_calls(), 1);
    assert!(a.finished());
}

#[tokio::test]
async fn concurrent_stops_are_idempotent() {
    let a = Arc::new(MockAdapter::new("svc-a"));

    let manager = Arc::new(Manager::builder().adapter(a.clone()).build());

    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (s1, s2) = {
        let m1 = manager.clone();
        let m2 = manager.clone();
        tokio::join!(
            tokio::spawn(async move { m1.stop().await }),
            tokio::spawn(async move { m2.stop().await }),
        )
    };
    s1.unwrap().expect("first stop succeeds");
    s2.unwrap().expect("second stop succeeds");

    assert!(runner.await.unwrap().is_ok());
    assert_eq!(a.stop_calls(), 1, "no duplicate request_stop invocations");
}

#[tokio::test]
async fn run_blocks_until_explicitly_stopped() {
    let manager = Arc::new(
        Manager::builder()
            .adapter(Arc::new(MockAdapter::new("svc-a")))
            .adapter(Arc::new(MockAdapter::new("svc-b")))
            .build(),
    );

    let mut runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };

    // No failure and no stop: run must still be blocked.
    let still_running = tokio::time::timeout(Duration::from_millis(300), &mut runner).await;
    assert!(still_running.is_err(), "run returned without being stopped");

    manager.stop().await.expect("stop succeeds");
    let outcome = tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("run should return promptly after stop")
        .unwrap();
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn stop_waits_for_the_adapter_drain() {
    let drain = Duration::from_millis(400);
    let a = Arc::new(MockAdapter::new("svc-a").with_drain(drain));

    let manager = Arc::new(Manager::builder().adapter(a.clone()).build());

    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    manager.stop().await.expect("stop succeeds");
    assert!(
        started.elapsed() >= drain,
        "stop returned before the drain completed"
    );
    assert!(a.finished());
    assert!(runner.await.unwrap().is_ok());
}
