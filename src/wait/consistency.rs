// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Consistency wrapper: require several consecutive successes.
//!
//! A pod that crash-loops is briefly `Running` between restarts, so a single
//! sample can pass while the workload is broken. `Consistently` only reports
//! success after the inner predicate passes `required_successes` times in a
//! row within one outer evaluation. A single failure ends the streak and is
//! returned as-is; progress never carries over to the next poll tick.

use super::predicate::Predicate;
use crate::constants::{DEFAULT_CONSISTENCY_DELAY_SECS, DEFAULT_REQUIRED_SUCCESSES};
use crate::errors::{CheckFailure, WaitError};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// How many consecutive successes are needed and how far apart they are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyConfig {
    required_successes: u32,
    delay: Duration,
}

impl ConsistencyConfig {
    /// # Errors
    ///
    /// Returns `WaitError::InvalidConfig` when `required_successes` is zero.
    pub fn new(required_successes: u32, delay: Duration) -> Result<Self, WaitError> {
        if required_successes == 0 {
            return Err(WaitError::InvalidConfig(
                "required consecutive successes must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            required_successes,
            delay,
        })
    }

    #[must_use]
    pub fn required_successes(&self) -> u32 {
        self.required_successes
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            required_successes: DEFAULT_REQUIRED_SUCCESSES,
            delay: Duration::from_secs(DEFAULT_CONSISTENCY_DELAY_SECS),
        }
    }
}

/// Wraps a predicate so it must succeed several times in a row.
pub struct Consistently<P> {
    inner: P,
    config: ConsistencyConfig,
}

impl<P: Predicate> Consistently<P> {
    pub fn new(inner: P, config: ConsistencyConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<P: Predicate> Predicate for Consistently<P> {
    fn describe(&self) -> String {
        format!(
            "{} (consistently, {} in a row)",
            self.inner.describe(),
            self.config.required_successes
        )
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckFailure> {
        let required = self.config.required_successes;

        for streak in 1..=required {
            self.inner.check(cancel).await?;
            trace!(
                predicate = %self.inner.describe(),
                streak = streak,
                required = required,
                "Consistency check passed"
            );

            if streak < required {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(CheckFailure::Interrupted),
                    () = tokio::time::sleep(self.config.delay) => {}
                }
            }
        }

        Ok(())
    }
}
