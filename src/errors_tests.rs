// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use crate::errors::{CheckFailure, ConfigError, WaitError};
    use std::time::Duration;

    #[test]
    fn test_timed_out_message_carries_last_failure() {
        let err = WaitError::TimedOut {
            description: "nodes ready".to_string(),
            attempts: 7,
            elapsed: Duration::from_secs(60),
            last: CheckFailure::unsatisfied("2/3 nodes Ready"),
        };

        let msg = err.to_string();
        assert!(msg.contains("nodes ready"), "message: {msg}");
        assert!(msg.contains("7 attempts"), "message: {msg}");
        assert!(msg.contains("2/3 nodes Ready"), "message: {msg}");
        assert_eq!(
            err.last_failure(),
            Some(&CheckFailure::Unsatisfied("2/3 nodes Ready".to_string()))
        );
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_message_with_and_without_last() {
        let without = WaitError::Cancelled {
            description: "pvc bound".to_string(),
            attempts: 0,
            last: None,
        };
        assert_eq!(
            without.to_string(),
            "cancelled after 0 attempts waiting for pvc bound"
        );
        assert!(without.is_cancelled());
        assert!(without.last_failure().is_none());

        let with = WaitError::Cancelled {
            description: "pvc bound".to_string(),
            attempts: 2,
            last: Some(CheckFailure::Read("connection refused".to_string())),
        };
        assert!(with.to_string().ends_with("(last: read failed: connection refused)"));
    }

    #[test]
    fn test_mismatch_vs_read_error() {
        assert!(CheckFailure::unsatisfied("x").is_mismatch());
        assert!(!CheckFailure::Read("x".to_string()).is_mismatch());
        assert!(!CheckFailure::Interrupted.is_mismatch());
    }

    #[test]
    fn test_kube_error_maps_to_read_failure() {
        let err = kube::Error::Api(
            kube::core::Status::failure("apiserver is shutting down", "ServiceUnavailable")
                .with_code(503)
                .boxed(),
        );

        match CheckFailure::from(err) {
            CheckFailure::Read(msg) => assert!(msg.contains("apiserver is shutting down")),
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn test_wait_error_converts_to_config_error() {
        let err: ConfigError = WaitError::InvalidConfig("interval must be > 0".to_string()).into();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("interval must be > 0")));
    }
}
