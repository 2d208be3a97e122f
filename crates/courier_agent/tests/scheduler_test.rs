//! End-to-end cycle tests against the simulated site.


use agent_test_helpers::{
    PASSWORD, ScriptedSource, Step, build_harness, build_harness_at, fast_settings, harness,
};
use courier_agent::{EXIT_AUTH, EXIT_FAILURE, SchedulerState, exit_status, next_delay};
use courier_core::{CycleOutcome, PageSelectors, Selector, SessionStatus};
use courier_error::{CourierErrorKind, SchedulerErrorKind};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn test_cycle_posts_content() {
    let h = harness(ScriptedSource::payloads(&["Hello"]));

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Success);
    assert_eq!(h.site.login_attempts(), 1);
    assert_eq!(h.site.confirmed_posts(), 1);
    assert_eq!(h.site.submissions()[0].body, "Hello");
    assert_eq!(h.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_fresh_session_skips_driver() {
    let h = harness(ScriptedSource::payloads(&["Hello"]));
    h.scheduler.run_once().await.expect("Cycle runs");
    let navigations = h.site.navigations();

    h.scheduler
        .sessions()
        .ensure_authenticated()
        .await
        .expect("Fresh session reused");

    assert_eq!(h.site.navigations(), navigations);
    assert_eq!(h.site.login_attempts(), 1);
}

#[tokio::test]
async fn test_stale_session_logs_in_again() {
    let mut settings = fast_settings();
    settings.freshness_window(Duration::ZERO);
    let h = build_harness(ScriptedSource::payloads(&["Hello", "World"]), settings, PASSWORD);

    h.scheduler.run_once().await.expect("First cycle");
    h.scheduler.run_once().await.expect("Second cycle");

    assert_eq!(h.site.login_attempts(), 2);
}

#[tokio::test]
async fn test_duplicate_content_skipped() {
    let h = harness(ScriptedSource::payloads(&["Hello", "Hello", "World"]));

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let result = h.scheduler.run_once().await.expect("Cycle runs");
        outcomes.push(*result.outcome());
    }

    assert_eq!(
        outcomes,
        vec![CycleOutcome::Success, CycleOutcome::Skipped, CycleOutcome::Success]
    );
    let bodies: Vec<String> = h.site.submissions().into_iter().map(|p| p.body).collect();
    assert_eq!(bodies, vec!["Hello".to_string(), "World".to_string()]);
}

#[tokio::test]
async fn test_structured_payload_sets_title() {
    let h = harness(ScriptedSource::payloads(&[
        r#"{"topic": "Weekly digest", "forumPost": "Body text"}"#,
    ]));

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Success);
    let post = &h.site.submissions()[0];
    assert_eq!(post.title.as_deref(), Some("Weekly digest"));
    assert_eq!(post.body, "Body text");
}

#[tokio::test]
async fn test_unconfirmed_submission_fails_after_attempts() {
    let h = harness(ScriptedSource::payloads(&["Hello"]));
    h.site.set_confirm_submissions(false);

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Failed);
    assert_eq!(h.site.submissions().len(), 3);
    assert_eq!(h.site.confirmed_posts(), 0);
    assert!(h.scheduler.publisher().last_published().is_none());
}

#[tokio::test]
async fn test_unconfirmed_post_is_not_a_duplicate() {
    let h = harness(ScriptedSource::payloads(&["Hello", "Hello"]));
    h.site.set_confirm_submissions(false);
    let first = h.scheduler.run_once().await.expect("First cycle");
    assert_eq!(*first.outcome(), CycleOutcome::Failed);

    h.site.set_confirm_submissions(true);
    let second = h.scheduler.run_once().await.expect("Second cycle");
    assert_eq!(*second.outcome(), CycleOutcome::Success);
}

#[tokio::test]
async fn test_session_expiry_reauthenticates_once() {
    let h = harness(ScriptedSource::payloads(&["Hello", "World"]));
    h.scheduler.run_once().await.expect("First cycle");
    let submissions = h.site.submissions().len();

    h.site.expire_sessions(1);
    let result = h.scheduler.run_once().await.expect("Second cycle");

    assert_eq!(*result.outcome(), CycleOutcome::Success);
    assert_eq!(h.site.login_attempts(), 2);
    assert_eq!(h.site.submissions().len(), submissions + 1);
    assert_eq!(h.scheduler.sessions().status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_root_login_url_does_not_mask_post_page() {
    let h = build_harness_at(
        "https://forum.example",
        ScriptedSource::payloads(&["Hello", "World"]),
        fast_settings(),
        PASSWORD,
    );

    let first = h.scheduler.run_once().await.expect("First cycle");
    assert_eq!(*first.outcome(), CycleOutcome::Success);
    assert_eq!(h.site.login_attempts(), 1);
    assert_eq!(h.site.confirmed_posts(), 1);

    h.site.expire_sessions(1);
    let second = h.scheduler.run_once().await.expect("Second cycle");
    assert_eq!(*second.outcome(), CycleOutcome::Success);
    assert_eq!(h.site.login_attempts(), 2);
    assert_eq!(h.site.confirmed_posts(), 2);
}

#[tokio::test]
async fn test_repeated_expiry_fails_without_looping() {
    let h = harness(ScriptedSource::payloads(&["Hello", "World"]));
    h.scheduler.run_once().await.expect("First cycle");

    h.site.expire_sessions(2);
    let result = h.scheduler.run_once().await.expect("Second cycle");

    assert_eq!(*result.outcome(), CycleOutcome::Failed);
    assert_eq!(h.site.login_attempts(), 2);
    assert_eq!(h.site.submissions().len(), 1);
}

#[tokio::test]
async fn test_invalid_credentials_are_fatal() {
    let h = build_harness(ScriptedSource::payloads(&["Hello"]), fast_settings(), "wrong");

    let err = h.scheduler.run_once().await.unwrap_err();

    assert!(matches!(err.kind(), CourierErrorKind::Auth(_)));
    assert_eq!(exit_status(&err), EXIT_AUTH);
    assert_eq!(h.scheduler.state(), SchedulerState::Fatal);
    assert_eq!(h.site.login_attempts(), 1);
    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.scheduler.sessions().status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_broken_login_form_retries_then_fails() {
    let h = harness(ScriptedSource::payloads(&["Hello"]));
    h.site.set_login_form_broken(true);

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Failed);
    assert_eq!(h.site.navigations(), 3);
    assert_eq!(h.site.login_attempts(), 0);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn test_driver_outage_fails_cycle() {
    let h = harness(ScriptedSource::payloads(&["Hello"]));
    h.site.set_transport_down(true);

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Failed);
    assert_eq!(h.site.navigations(), 0);
}

#[tokio::test]
async fn test_invalid_payload_skips_without_retry() {
    let h = harness(ScriptedSource::payloads(&[r#"{"message": "no fields"}"#]));

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Skipped);
    assert_eq!(h.source.calls(), 1);
    assert!(h.site.submissions().is_empty());
}

#[tokio::test]
async fn test_unreachable_source_retries_then_fails() {
    let h = harness(ScriptedSource::new([
        Step::Unreachable,
        Step::Unreachable,
        Step::Unreachable,
    ]));

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Failed);
    assert_eq!(h.source.calls(), 3);
}

#[tokio::test]
async fn test_fetch_recovers_within_cycle() {
    let h = harness(ScriptedSource::new([Step::Unreachable, Step::Payload("Hello")]));

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Success);
    assert_eq!(h.source.calls(), 2);
}

#[tokio::test]
async fn test_circuit_breaker_halts_scheduler() {
    let mut settings = fast_settings();
    settings.circuit_breaker_threshold(Some(2));
    let h = build_harness(ScriptedSource::payloads(&["a", "b"]), settings, PASSWORD);
    h.site.set_transport_down(true);

    let first = h.scheduler.run_once().await.expect("First failure tolerated");
    assert_eq!(*first.outcome(), CycleOutcome::Failed);

    let err = h.scheduler.run_once().await.unwrap_err();
    match err.kind() {
        CourierErrorKind::Scheduler(e) => {
            assert_eq!(e.kind, SchedulerErrorKind::CircuitBreakerOpen(2))
        }
        other => panic!("Expected scheduler error, got {:?}", other),
    }
    assert_eq!(exit_status(&err), EXIT_FAILURE);
    assert_eq!(h.scheduler.state(), SchedulerState::Fatal);
    assert_eq!(h.scheduler.stats().snapshot().failed, 2);
}

#[tokio::test]
async fn test_category_and_confirmation_selectors() {
    let selectors = PageSelectors::default()
        .with_category(Selector::css("#category"), Selector::css("#category-row-3"))
        .with_confirmation(Selector::css(".topic-post"));
    let mut settings = fast_settings();
    settings.selectors(selectors);
    let h = build_harness(ScriptedSource::payloads(&["Hello"]), settings, PASSWORD);

    let result = h.scheduler.run_once().await.expect("Cycle runs");

    assert_eq!(*result.outcome(), CycleOutcome::Success);
    assert_eq!(h.site.confirmed_posts(), 1);
}

#[tokio::test]
async fn test_run_stops_on_shutdown_between_cycles() {
    let h = harness(ScriptedSource::payloads(&["Hello", "World"]));

    h.scheduler.run(async {}).await.expect("Clean shutdown");

    let stats = h.scheduler.stats().snapshot();
    assert_eq!(stats.total(), 1);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(h.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_run_halts_on_fatal_error() {
    let h = build_harness(ScriptedSource::payloads(&["Hello"]), fast_settings(), "wrong");

    let err = h
        .scheduler
        .run(std::future::pending::<()>())
        .await
        .unwrap_err();

    assert_eq!(exit_status(&err), EXIT_AUTH);
    assert_eq!(h.scheduler.state(), SchedulerState::Fatal);
}

#[test]
fn test_overrunning_cycle_starts_next_immediately() {
    let started = Instant::now();
    let interval = Duration::from_secs(5 * 60);

    let delay = next_delay(started, started + Duration::from_secs(7 * 60), interval);
    assert_eq!(delay, Duration::ZERO);

    let delay = next_delay(started, started + Duration::from_secs(2 * 60), interval);
    assert_eq!(delay, Duration::from_secs(3 * 60));
}

#[test]
fn test_unbounded_interval_does_not_overflow() {
    let started = Instant::now();
    let now = started + Duration::from_secs(60);

    let delay = next_delay(started, now, Duration::MAX);
    assert_eq!(delay, Duration::MAX - Duration::from_secs(60));
}
