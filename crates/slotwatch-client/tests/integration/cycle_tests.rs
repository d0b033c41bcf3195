use slotwatch_core::testutil::MockReporter;
use slotwatch_core::{AvailabilityState, CycleOutcome, Delivery, MonitorState, StatusSignal};

use crate::common::{Harness, LIMIT_PHRASE, homepage};

#[tokio::test]
async fn recognized_page_without_counts_notifies_after_closed() {
    let harness = Harness::start().await;
    let page = harness.serve_page(200, &homepage("", "")).await;
    let hook = harness.accept_webhook().await;

    let report = harness
        .service()
        .run_cycle(
            MonitorState::new(AvailabilityState::Closed),
            &MockReporter::new(),
        )
        .await;

    assert_eq!(report.state.last(), AvailabilityState::Open);
    match report.outcome {
        CycleOutcome::Completed {
            intent, delivery, ..
        } => {
            assert!(intent.should_notify);
            assert_eq!(intent.reason, "became available");
            assert!(matches!(delivery, Delivery::Sent));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    page.assert_async().await;
    hook.assert_async().await;
}

#[tokio::test]
async fn full_counter_is_closed_and_silent() {
    let harness = Harness::start().await;
    harness
        .serve_page(
            200,
            &homepage(
                r#"<strong class="is--counter--accounts" data-count="170000">170,000</strong>
                   <span data-limit="170000">170,000</span>"#,
                "",
            ),
        )
        .await;
    let hook = harness.accept_webhook().await;

    let report = harness
        .service()
        .run_cycle(MonitorState::default(), &MockReporter::new())
        .await;

    assert_eq!(report.state.last(), AvailabilityState::Closed);
    match report.outcome {
        CycleOutcome::Completed { observation, .. } => {
            assert_eq!(
                observation.signal,
                StatusSignal::new(Some(170_000), Some(170_000))
            );
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(hook.hits_async().await, 0);
}

#[tokio::test]
async fn service_unavailable_aborts_cycle() {
    let harness = Harness::start().await;
    harness.serve_page(503, "maintenance").await;
    let hook = harness.accept_webhook().await;
    let reporter = MockReporter::new();

    let report = harness
        .service()
        .run_cycle(MonitorState::new(AvailabilityState::Closed), &reporter)
        .await;

    assert_eq!(report.state.last(), AvailabilityState::Closed);
    match report.outcome {
        CycleOutcome::FetchFailed(err) => assert_eq!(err.status_code(), Some(503)),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(hook.hits_async().await, 0);
    assert_eq!(
        *reporter.events.lock().unwrap(),
        vec!["Checking", "FetchFailed"]
    );
}

#[tokio::test]
async fn captcha_page_is_unknown_then_reopening_notifies() {
    let harness = Harness::start().await;
    let hook = harness.accept_webhook().await;
    let service = harness.service();
    let reporter = MockReporter::new();

    let mut captcha = harness
        .serve_page(200, "<html><body>Please verify you are human</body></html>")
        .await;
    let report = service
        .run_cycle(MonitorState::new(AvailabilityState::Open), &reporter)
        .await;
    assert_eq!(report.state.last(), AvailabilityState::Unknown);
    assert_eq!(hook.hits_async().await, 0);
    captcha.delete_async().await;

    harness
        .serve_page(
            200,
            &homepage(
                r#"<span data-accounts="169999"></span><span data-limit="170000"></span>"#,
                "",
            ),
        )
        .await;
    let report = service.run_cycle(report.state, &reporter).await;

    assert_eq!(report.state.last(), AvailabilityState::Open);
    assert_eq!(hook.hits_async().await, 1);
}

#[tokio::test]
async fn limit_phrase_beats_open_counts() {
    let harness = Harness::start().await;
    harness
        .serve_page(
            200,
            &homepage(
                r#"<span data-accounts="5"></span><span data-limit="170000"></span>"#,
                &format!("<p>{LIMIT_PHRASE}.</p>"),
            ),
        )
        .await;
    let hook = harness.accept_webhook().await;

    let report = harness
        .service()
        .run_cycle(MonitorState::new(AvailabilityState::Closed), &MockReporter::new())
        .await;

    assert_eq!(report.state.last(), AvailabilityState::Closed);
    assert_eq!(hook.hits_async().await, 0);
}

#[tokio::test]
async fn stays_open_without_repeat_notifications() {
    let harness = Harness::start().await;
    harness
        .serve_page(
            200,
            &homepage(
                r#"<strong class="is--counter--accounts">1,234</strong>
                   <strong class="is--counter--limit">170,000</strong>"#,
                "",
            ),
        )
        .await;
    let hook = harness.accept_webhook().await;
    let service = harness.service();
    let reporter = MockReporter::new();

    let mut state = MonitorState::new(AvailabilityState::Closed);
    for _ in 0..3 {
        state = service.run_cycle(state, &reporter).await.state;
    }

    assert_eq!(state.last(), AvailabilityState::Open);
    assert_eq!(hook.hits_async().await, 1);
}

#[tokio::test]
async fn failed_webhook_does_not_roll_back_state() {
    let harness = Harness::start().await;
    harness.serve_page(200, &homepage("", "")).await;
    harness.reject_webhook(500).await;

    let report = harness
        .service()
        .run_cycle(MonitorState::new(AvailabilityState::Closed), &MockReporter::new())
        .await;

    assert_eq!(report.state.last(), AvailabilityState::Open);
    assert!(matches!(
        report.outcome,
        CycleOutcome::Completed {
            delivery: Delivery::Failed(_),
            ..
        }
    ));
}
