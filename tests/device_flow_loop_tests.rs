mod support;

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use realmkit::auth::{AuthError, DeviceFlow, DeviceFlowOutcome, FlowState};

use support::{issued, rejected, session, unreachable, ScriptedPoller};

fn assert_gap(gap: Duration, secs: u64) {
    let expected = Duration::from_secs(secs);
    assert!(
        gap >= expected && gap < expected + Duration::from_millis(50),
        "expected a gap of {secs}s, got {gap:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn pending_twice_then_token_succeeds_on_third_poll() {
    let poller = ScriptedPoller::new(vec![
        rejected("authorization_pending"),
        rejected("authorization_pending"),
        issued("tok123"),
    ]);
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.state(), FlowState::Succeeded);
    assert_eq!(outcome.polls(), 3);
    let gaps = poller.gaps(started);
    assert_eq!(gaps.len(), 3);
    for gap in gaps {
        assert_gap(gap, 5);
    }
    match outcome {
        DeviceFlowOutcome::Succeeded { token, .. } => assert_eq!(token.access_token, "tok123"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_down_widens_interval_until_expiry() {
    let poller = ScriptedPoller::new(vec![
        rejected("authorization_pending"),
        rejected("slow_down"),
        rejected("authorization_pending"),
        rejected("expired_token"),
    ]);
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.state(), FlowState::Failed);
    assert_eq!(outcome.polls(), 4);
    let gaps = poller.gaps(started);
    assert_gap(gaps[0], 5);
    assert_gap(gaps[1], 5);
    assert_gap(gaps[2], 10);
    assert_gap(gaps[3], 10);
    assert!(gaps[2] > gaps[1]);
    assert!(matches!(
        outcome.into_result(),
        Err(AuthError::Expired(error)) if error.kind == "expired_token"
    ));
}

#[tokio::test(start_paused = true)]
async fn access_denied_stops_after_one_poll() {
    let poller = ScriptedPoller::new(vec![rejected("access_denied")]);

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.polls(), 1);
    assert!(matches!(outcome.into_result(), Err(AuthError::AccessDenied(_))));
}

#[tokio::test(start_paused = true)]
async fn unknown_provider_error_is_terminal() {
    let poller = ScriptedPoller::new(vec![rejected("invalid_grant"), issued("never")]);

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.polls(), 1);
    assert_eq!(poller.poll_times().len(), 1);
    assert!(matches!(
        outcome.into_result(),
        Err(AuthError::Flow(error)) if error.kind == "invalid_grant"
    ));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_keeps_polling_at_same_interval() {
    let poller = ScriptedPoller::new(vec![unreachable(), unreachable(), issued("tok123")]);
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .run(&poller, &session(3, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.state(), FlowState::Succeeded);
    assert_eq!(outcome.polls(), 3);
    for gap in poller.gaps(started) {
        assert_gap(gap, 3);
    }
}

#[tokio::test(start_paused = true)]
async fn never_completing_flow_times_out_at_session_expiry() {
    let poller = ScriptedPoller::default();
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, 12), &CancellationToken::new())
        .await;

    assert_eq!(outcome.polls(), 2);
    assert_gap(started.elapsed(), 12);
    assert!(matches!(
        outcome.into_result(),
        Err(AuthError::TimedOut { waited_secs: 12 })
    ));
}

#[tokio::test(start_paused = true)]
async fn longer_max_wait_extends_deadline() {
    let poller = ScriptedPoller::default();
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .with_max_wait(Some(Duration::from_secs(21)))
        .run(&poller, &session(5, 12), &CancellationToken::new())
        .await;

    assert_eq!(outcome.polls(), 4);
    assert_gap(started.elapsed(), 21);
    assert!(matches!(
        outcome.into_result(),
        Err(AuthError::TimedOut { waited_secs: 21 })
    ));
}

#[test]
fn max_wait_never_shortens_session_lifetime() {
    let session = session(5, 600);
    let short = DeviceFlow::new().with_max_wait(Some(Duration::from_secs(30)));
    let long = DeviceFlow::new().with_max_wait(Some(Duration::from_secs(900)));

    assert_eq!(short.wait_limit(&session), Duration::from_secs(600));
    assert_eq!(long.wait_limit(&session), Duration::from_secs(900));
    assert_eq!(DeviceFlow::new().wait_limit(&session), Duration::from_secs(600));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_polling() {
    let poller = ScriptedPoller::default();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        trigger.cancel();
    });

    let outcome = DeviceFlow::new().run(&poller, &session(5, 600), &cancel).await;

    assert_eq!(outcome.state(), FlowState::Cancelled);
    assert_eq!(outcome.polls(), 2);
    assert!(matches!(outcome.into_result(), Err(AuthError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_flow_never_polls() {
    let poller = ScriptedPoller::new(vec![issued("tok123")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = DeviceFlow::new().run(&poller, &session(5, 600), &cancel).await;

    assert_eq!(outcome.polls(), 0);
    assert!(poller.poll_times().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_interval_still_waits_between_polls() {
    let poller = ScriptedPoller::new(vec![
        rejected("authorization_pending"),
        rejected("authorization_pending"),
        issued("tok123"),
    ]);
    let started = Instant::now();

    let outcome = DeviceFlow::new()
        .run(&poller, &session(0, 600), &CancellationToken::new())
        .await;

    assert_eq!(outcome.state(), FlowState::Succeeded);
    assert_eq!(outcome.polls(), 3);
    for gap in poller.gaps(started) {
        assert_gap(gap, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn huge_session_lifetime_does_not_break_loop() {
    let poller = ScriptedPoller::new(vec![rejected("authorization_pending"), issued("tok123")]);

    let outcome = DeviceFlow::new()
        .run(&poller, &session(5, u64::MAX / 2), &CancellationToken::new())
        .await;

    assert_eq!(outcome.state(), FlowState::Succeeded);
    assert_eq!(outcome.polls(), 2);
}
