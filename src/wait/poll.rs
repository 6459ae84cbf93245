// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The poll loop: evaluate a predicate at a fixed cadence until it holds.
//!
//! # Timing
//!
//! - The first evaluation happens immediately.
//! - Evaluations never overlap: each tick evaluates, then sleeps for whatever
//!   remains of `interval` measured from the start of that tick.
//! - The deadline is `timeout` after the first tick and is never extended. A
//!   tick may start exactly at the deadline, none starts after it. An
//!   evaluation that runs past the deadline is allowed to finish.
//! - Cancellation is checked before every tick and raced against every sleep.

use super::consistency::{ConsistencyConfig, Consistently};
use super::predicate::Predicate;
use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS, POLL_WARN_EVERY_ATTEMPTS};
use crate::errors::{CheckFailure, WaitError};
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Overall timeout and tick interval of a poll loop.
///
/// Invariants: `interval > 0`, `timeout >= interval` and `now + timeout` is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    timeout: Duration,
    interval: Duration,
}

impl PollConfig {
    /// # Errors
    ///
    /// Returns `WaitError::InvalidConfig` when `interval` is zero or exceeds `timeout`,
    /// or when `timeout` cannot be added to the current instant.
    pub fn new(timeout: Duration, interval: Duration) -> Result<Self, WaitError> {
        if interval.is_zero() {
            return Err(WaitError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if timeout < interval {
            return Err(WaitError::InvalidConfig(format!(
                "poll timeout {timeout:?} is shorter than interval {interval:?}"
            )));
        }
        if Instant::now().checked_add(timeout).is_none() {
            return Err(WaitError::InvalidConfig(format!(
                "poll timeout {timeout:?} is too large"
            )));
        }
        Ok(Self { timeout, interval })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Lifecycle of a single poll loop. `Polling` is the only non-terminal state after start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Succeeded,
    TimedOut,
    Cancelled,
}

impl PollState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::TimedOut | Self::Cancelled)
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "Idle",
            Self::Polling => "Polling",
            Self::Succeeded => "Succeeded",
            Self::TimedOut => "TimedOut",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// What a successful poll loop observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Number of predicate evaluations, including the successful one
    pub attempts: u32,
    /// Time from the first tick until success
    pub elapsed: Duration,
}

/// Poll `predicate` until it succeeds, the deadline passes or `cancel` fires.
///
/// # Errors
///
/// - `WaitError::TimedOut` with the most recent failure once the deadline passes
/// - `WaitError::Cancelled` when `cancel` fires before success
/// - `WaitError::InvalidConfig` when the deadline cannot be represented
///
/// # Example
///
/// ```rust,no_run
/// use cluster_e2e::errors::CheckFailure;
/// use cluster_e2e::wait::{poll_until, predicate_fn, PollConfig};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let cancel = CancellationToken::new();
/// let config = PollConfig::new(Duration::from_secs(60), Duration::from_secs(5))?;
/// let ready = predicate_fn("api reachable", || async { Ok::<(), CheckFailure>(()) });
///
/// let summary = poll_until(&cancel, &ready, &config).await?;
/// println!("ready after {} attempts", summary.attempts);
/// # Ok(())
/// # }
/// ```
pub async fn poll_until<P>(
    cancel: &CancellationToken,
    predicate: &P,
    config: &PollConfig,
) -> Result<PollSummary, WaitError>
where
    P: Predicate + ?Sized,
{
    let description = predicate.describe();
    let start = Instant::now();
    let deadline = start.checked_add(config.timeout).ok_or_else(|| {
        WaitError::InvalidConfig(format!("poll timeout {:?} is too large", config.timeout))
    })?;
    let mut attempts: u32 = 0;
    let mut last: Option<CheckFailure> = None;

    debug!(
        predicate = %description,
        state = %PollState::Polling,
        timeout = ?config.timeout,
        interval = ?config.interval,
        "Starting poll loop"
    );

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(description, attempts, last));
        }

        attempts += 1;
        let tick_start = Instant::now();

        let failure = match predicate.check(cancel).await {
            Ok(()) => {
                let elapsed = start.elapsed();
                info!(
                    predicate = %description,
                    state = %PollState::Succeeded,
                    attempts = attempts,
                    elapsed = ?elapsed,
                    "Condition met"
                );
                return Ok(PollSummary { attempts, elapsed });
            }
            Err(failure) => failure,
        };

        if attempts % POLL_WARN_EVERY_ATTEMPTS == 0 {
            warn!(
                predicate = %description,
                attempt = attempts,
                elapsed = ?start.elapsed(),
                reason = %failure,
                "Still waiting for condition"
            );
        } else {
            debug!(
                predicate = %description,
                attempt = attempts,
                reason = %failure,
                "Condition not met yet"
            );
        }

        if cancel.is_cancelled() {
            return Err(cancelled(description, attempts, Some(failure)));
        }

        if Instant::now() >= deadline {
            let elapsed = start.elapsed();
            warn!(
                predicate = %description,
                state = %PollState::TimedOut,
                attempts = attempts,
                elapsed = ?elapsed,
                reason = %failure,
                "Gave up waiting for condition"
            );
            return Err(WaitError::TimedOut {
                description,
                attempts,
                elapsed,
                last: failure,
            });
        }

        last = Some(failure);
        let wake = (tick_start + config.interval).min(deadline);

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(description, attempts, last)),
            () = sleep_until(wake) => {}
        }
    }
}

/// Poll `predicate` until it succeeds `consistency.required_successes()` times in a row.
///
/// The outer deadline counts from the first tick and is never extended when a
/// streak breaks.
///
/// # Errors
///
/// Same as [`poll_until`].
pub async fn poll_until_consistent<P>(
    cancel: &CancellationToken,
    predicate: &P,
    consistency: &ConsistencyConfig,
    config: &PollConfig,
) -> Result<PollSummary, WaitError>
where
    P: Predicate + ?Sized,
{
    let wrapped = Consistently::new(predicate, *consistency);
    poll_until(cancel, &wrapped, config).await
}

fn cancelled(description: String, attempts: u32, last: Option<CheckFailure>) -> WaitError {
    warn!(
        predicate = %description,
        state = %PollState::Cancelled,
        attempts = attempts,
        "Poll loop cancelled"
    );
    WaitError::Cancelled {
        description,
        attempts,
        last,
    }
}
