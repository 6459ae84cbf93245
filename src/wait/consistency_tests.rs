// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `consistency.rs`

#[cfg(test)]
mod tests {
    use crate::errors::{CheckFailure, WaitError};
    use crate::wait::{ConsistencyConfig, Consistently, Predicate, ScriptedPredicate};
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn config(required: u32, delay_secs: u64) -> ConsistencyConfig {
        ConsistencyConfig::new(required, Duration::from_secs(delay_secs)).unwrap()
    }

    #[test]
    fn test_zero_required_successes_rejected() {
        let err = ConsistencyConfig::new(0, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, WaitError::InvalidConfig(_)));
    }

    #[test]
    fn test_default_config() {
        let cfg = ConsistencyConfig::default();
        assert_eq!(cfg.required_successes(), 3);
        assert_eq!(cfg.delay(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_successes_pass_without_trailing_delay() {
        let inner = ScriptedPredicate::from_bools("always", &[true]);
        let wrapped = Consistently::new(&inner, config(5, 1));
        let cancel = CancellationToken::new();

        let start = Instant::now();
        assert_eq!(wrapped.check(&cancel).await, Ok(()));

        // 5 checks separated by 4 delays
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(inner.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_returned_immediately() {
        let inner = ScriptedPredicate::new(
            "flaky",
            vec![
                Ok(()),
                Err(CheckFailure::Read("connection reset".to_string())),
                Err(CheckFailure::unsatisfied("never reached")),
            ],
        );
        let wrapped = Consistently::new(&inner, config(3, 2));
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let result = wrapped.check(&cancel).await;

        assert_eq!(
            result,
            Err(CheckFailure::Read("connection reset".to_string()))
        );
        assert_eq!(inner.calls(), 2, "Evaluation stops at the first failure");
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_streak_does_not_carry_over_between_calls() {
        // Two successes then a failure; the next outer call starts from zero
        let inner = ScriptedPredicate::from_bools("streak", &[true, true, false, true, true, true]);
        let wrapped = Consistently::new(&inner, config(3, 0));
        let cancel = CancellationToken::new();

        assert!(wrapped.check(&cancel).await.is_err());
        assert_eq!(inner.calls(), 3);

        assert_eq!(wrapped.check(&cancel).await, Ok(()));
        assert_eq!(inner.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_delay() {
        let inner = ScriptedPredicate::from_bools("always", &[true]);
        let wrapped = Consistently::new(&inner, config(3, 10));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        assert_eq!(wrapped.check(&cancel).await, Err(CheckFailure::Interrupted));
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(inner.calls(), 1);
    }

    #[test]
    fn test_describe_mentions_streak_length() {
        let inner = ScriptedPredicate::from_bools("pods running", &[true]);
        let wrapped = Consistently::new(inner, config(4, 1));
        assert_eq!(wrapped.describe(), "pods running (consistently, 4 in a row)");
    }
}
