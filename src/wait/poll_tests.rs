// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `poll.rs`
//!
//! All timing tests run on a paused tokio clock, so elapsed durations are exact.

#[cfg(test)]
mod tests {
    use crate::errors::{CheckFailure, WaitError};
    use crate::wait::{
        poll_until, poll_until_consistent, predicate_fn, ConsistencyConfig, PollConfig,
        PollState, ScriptedPredicate,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn poll(timeout_secs: u64, interval_secs: u64) -> PollConfig {
        PollConfig::new(
            Duration::from_secs(timeout_secs),
            Duration::from_secs(interval_secs),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = PollConfig::new(Duration::from_secs(10), Duration::ZERO).unwrap_err();
        assert!(matches!(err, WaitError::InvalidConfig(_)));
    }

    #[test]
    fn test_timeout_shorter_than_interval_rejected() {
        let err = PollConfig::new(Duration::from_secs(1), Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, WaitError::InvalidConfig(_)));
    }

    #[test]
    fn test_unrepresentable_timeout_rejected() {
        let err = PollConfig::new(Duration::from_secs(u64::MAX), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, WaitError::InvalidConfig(ref m) if m.contains("too large")));
    }

    #[test]
    fn test_timeout_equal_to_interval_accepted() {
        assert!(PollConfig::new(Duration::from_secs(5), Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_poll_state_terminality() {
        assert!(!PollState::Idle.is_terminal());
        assert!(!PollState::Polling.is_terminal());
        assert!(PollState::Succeeded.is_terminal());
        assert!(PollState::TimedOut.is_terminal());
        assert!(PollState::Cancelled.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let predicate = ScriptedPredicate::from_bools("ready", &[true]);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let summary = poll_until(&cancel, &predicate, &poll(10, 1)).await.unwrap();

        assert_eq!(summary.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_three_failures() {
        let predicate = ScriptedPredicate::from_bools("nodes", &[false, false, false, true]);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let summary = poll_until(&cancel, &predicate, &poll(10, 1)).await.unwrap();

        assert_eq!(summary.attempts, 4);
        assert_eq!(summary.elapsed, Duration::from_secs(3));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_times_out_with_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let predicate = predicate_fn("never ready", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(CheckFailure::Unsatisfied(format!("observation {n}"))) }
        });
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let err = poll_until(&cancel, &predicate, &poll(5, 1)).await.unwrap_err();

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        match err {
            WaitError::TimedOut {
                description,
                attempts,
                elapsed,
                last,
            } => {
                assert_eq!(description, "never ready");
                // Ticks at 0s, 1s, 2s, 3s, 4s and the final one at the deadline
                assert_eq!(attempts, 6);
                assert_eq!(elapsed, Duration::from_secs(5));
                assert_eq!(last, CheckFailure::Unsatisfied("observation 6".to_string()));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_errors_are_retried() {
        let predicate = ScriptedPredicate::new(
            "api",
            vec![
                Err(CheckFailure::Read("connection refused".to_string())),
                Err(CheckFailure::Read("connection refused".to_string())),
                Ok(()),
            ],
        );
        let cancel = CancellationToken::new();

        let summary = poll_until(&cancel, &predicate, &poll(30, 2)).await.unwrap();
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.elapsed, Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_predicate_sleeps_only_remaining_interval() {
        let predicate = predicate_fn("slow", || async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Err(CheckFailure::unsatisfied("still slow"))
        });
        let cancel = CancellationToken::new();

        let err = poll_until(&cancel, &predicate, &poll(3, 1)).await.unwrap_err();

        // Ticks start at 0s, 1s, 2s, 3s; the last one finishes at 3.4s
        match err {
            WaitError::TimedOut {
                attempts, elapsed, ..
            } => {
                assert_eq!(attempts, 4);
                assert_eq!(elapsed, Duration::from_millis(3400));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_within_one_tick() {
        let predicate = ScriptedPredicate::from_bools("never", &[false]);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let err = poll_until(&cancel, &predicate, &poll(60, 1)).await.unwrap_err();

        assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
        assert_eq!(predicate.calls(), 3);
        assert_eq!(
            err.last_failure(),
            Some(&CheckFailure::Unsatisfied("scripted failure #1".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_evaluates() {
        let predicate = ScriptedPredicate::from_bools("never", &[true]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poll_until(&cancel, &predicate, &poll(10, 1)).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(predicate.calls(), 0);
        assert!(err.last_failure().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consistent_requires_uninterrupted_streak() {
        // fail, then three successes: the first success alone must not satisfy the check
        let predicate = ScriptedPredicate::from_bools("pods", &[false, true, true, true]);
        let cancel = CancellationToken::new();
        let consistency = ConsistencyConfig::new(3, Duration::ZERO).unwrap();

        let summary = poll_until_consistent(&cancel, &predicate, &consistency, &poll(30, 1))
            .await
            .unwrap();

        assert_eq!(summary.attempts, 2, "Second outer tick holds the full streak");
        assert_eq!(predicate.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consistent_resets_streak_on_failure() {
        let predicate =
            ScriptedPredicate::from_bools("pods", &[true, true, false, true, true, true]);
        let cancel = CancellationToken::new();
        let consistency = ConsistencyConfig::new(3, Duration::ZERO).unwrap();

        let summary = poll_until_consistent(&cancel, &predicate, &consistency, &poll(30, 1))
            .await
            .unwrap();

        assert_eq!(summary.attempts, 2);
        assert_eq!(predicate.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consistent_always_true_takes_required_delays() {
        let predicate = ScriptedPredicate::from_bools("always", &[true]);
        let cancel = CancellationToken::new();
        let consistency = ConsistencyConfig::new(5, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let summary = poll_until_consistent(&cancel, &predicate, &consistency, &poll(30, 1))
            .await
            .unwrap();

        assert_eq!(summary.attempts, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(predicate.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consistent_deadline_not_extended_by_streak_resets() {
        // Succeeds twice then fails, forever: never three in a row
        let predicate = ScriptedPredicate::from_bools(
            "flapping",
            &[
                true, true, false, true, true, false, true, true, false, true, true, false,
            ],
        );
        let cancel = CancellationToken::new();
        let consistency = ConsistencyConfig::new(3, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let err = poll_until_consistent(&cancel, &predicate, &consistency, &poll(6, 3))
            .await
            .unwrap_err();

        // Outer ticks at 0s, 3s, 6s; each streak spends 2s before failing
        assert!(matches!(err, WaitError::TimedOut { attempts: 3, .. }), "{err:?}");
        assert_eq!(start.elapsed(), Duration::from_secs(8));
    }
}
