// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Condition-polling evaluator.
//!
//! Every readiness check in the suite is a [`Predicate`] driven by
//! [`poll_until`] or [`poll_until_consistent`]:
//!
//! - [`Predicate`] - one fresh read of external state per call
//! - [`CountRange`] - inclusive bound for elastic counts (autoscaled pools)
//! - [`Consistently`] - requires N consecutive successes before passing
//! - [`poll_until`] - evaluates at a fixed interval until success, timeout or cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use cluster_e2e::wait::{poll_until_consistent, ConsistencyConfig, PollConfig, ScriptedPredicate};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cancel = CancellationToken::new();
//! let flaky = ScriptedPredicate::from_bools("pods running", &[true, false, true, true, true]);
//! let consistency = ConsistencyConfig::new(3, Duration::from_secs(1))?;
//! let config = PollConfig::new(Duration::from_secs(30), Duration::from_secs(1))?;
//!
//! poll_until_consistent(&cancel, &flaky, &consistency, &config).await?;
//! # Ok(())
//! # }
//! ```

pub mod consistency;
pub mod poll;
pub mod predicate;
pub mod range;
pub mod scripted;

pub use consistency::{ConsistencyConfig, Consistently};
pub use poll::{poll_until, poll_until_consistent, PollConfig, PollState, PollSummary};
pub use predicate::{predicate_fn, FnPredicate, Predicate};
pub use range::CountRange;
pub use scripted::ScriptedPredicate;

#[cfg(test)]
mod consistency_tests;
#[cfg(test)]
mod poll_tests;
