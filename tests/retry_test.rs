use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use skyscout::error::FlightError;
use skyscout::retry::{with_retry, RetryPolicy};

async fn count_attempts(policy: &RetryPolicy, err: FlightError) -> (usize, FlightError) {
    let attempts = AtomicUsize::new(0);
    let cancel = CancellationToken::new();
    let result: Result<(), FlightError> = with_retry(policy, &cancel, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        let err = err.clone();
        async move { Err(err) }
    })
    .await;
    (attempts.load(Ordering::SeqCst), result.unwrap_err())
}

#[tokio::test(start_paused = true)]
async fn rate_limit_is_attempted_once() {
    let (attempts, err) = count_attempts(&RetryPolicy::default(), FlightError::RateLimited).await;
    assert_eq!(attempts, 1);
    assert!(matches!(err, FlightError::RateLimited));
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_attempted_once() {
    for status in [400, 401, 403, 404] {
        let (attempts, _) =
            count_attempts(&RetryPolicy::default(), FlightError::HttpStatus(status)).await;
        assert_eq!(attempts, 1, "status {status}");
    }
}

#[tokio::test(start_paused = true)]
async fn service_unavailable_uses_every_retry() {
    let policy = RetryPolicy::default();
    let (attempts, err) = count_attempts(&policy, FlightError::HttpStatus(503)).await;
    assert_eq!(attempts, policy.max_retries as usize + 1);
    assert!(matches!(err, FlightError::HttpStatus(503)));
}

#[tokio::test(start_paused = true)]
async fn network_errors_are_retried() {
    let (attempts, _) = count_attempts(
        &RetryPolicy::default(),
        FlightError::ConnectionFailed("reset".into()),
    )
    .await;
    assert_eq!(attempts, 3);
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failure() {
    let attempts = AtomicUsize::new(0);
    let cancel = CancellationToken::new();
    let result = with_retry(&RetryPolicy::default(), &cancel, || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Err(FlightError::Timeout)
            } else {
                Ok("ok")
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_backoff() {
    let attempts = AtomicUsize::new(0);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result: Result<(), FlightError> = with_retry(&RetryPolicy::default(), &cancel, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(FlightError::HttpStatus(503)) }
    })
    .await;

    assert!(matches!(result, Err(FlightError::Cancelled)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_token_skips_the_operation() {
    let attempts = AtomicUsize::new(0);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result: Result<(), FlightError> = with_retry(&RetryPolicy::default(), &cancel, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    })
    .await;
    assert!(matches!(result, Err(FlightError::Cancelled)));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[test]
fn backoff_doubles_and_is_capped() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_with_jitter(0, 0.0), Duration::from_millis(1000));
    assert_eq!(policy.delay_with_jitter(1, 0.0), Duration::from_millis(2000));
    assert_eq!(policy.delay_with_jitter(2, 0.0), Duration::from_millis(4000));
    assert_eq!(policy.delay_with_jitter(6, 0.0), Duration::from_millis(10_000));
    assert_eq!(policy.delay_with_jitter(1, 0.25), Duration::from_millis(2500));
    assert_eq!(policy.delay_with_jitter(1, 5.0), Duration::from_millis(2500));
}

#[test]
fn jittered_delay_stays_in_bounds() {
    let policy = RetryPolicy::default();
    for _ in 0..50 {
        let delay = policy.delay_for(0);
        assert!(delay >= Duration::from_millis(1000));
        assert!(delay <= Duration::from_millis(1250));
    }
}
