// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the cluster e2e harness.
//!
//! This module provides specialized error types for:
//! - Single predicate evaluations (`CheckFailure`)
//! - Poll loop termination (`WaitError`)
//! - Suite configuration loading (`ConfigError`)
//! - One-shot create/delete steps against the cluster (`ActionError`)
//!
//! A `CheckFailure` is never fatal on its own. The poll loop keeps the most
//! recent one and surfaces it inside `WaitError::TimedOut` so the operator sees
//! what the cluster looked like when the harness gave up.

use std::time::Duration;
use thiserror::Error;

/// Outcome of a single failed predicate evaluation.
///
/// The poll loop treats all variants as retryable. The distinction exists so
/// that timeout messages tell a read problem apart from a state mismatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// The read succeeded but the observed state does not satisfy the condition
    ///
    /// Example: "2/3 nodes matching 'role=worker' are Ready".
    #[error("condition not met: {0}")]
    Unsatisfied(String),

    /// The external state could not be read
    ///
    /// Connection errors, API server 5xx responses and other transport problems.
    /// The message is the rendered source error, which keeps this type `Clone`.
    #[error("read failed: {0}")]
    Read(String),

    /// The predicate observed cancellation while waiting internally
    #[error("evaluation interrupted by cancellation")]
    Interrupted,
}

impl CheckFailure {
    /// Build an `Unsatisfied` failure from anything printable.
    pub fn unsatisfied(reason: impl Into<String>) -> Self {
        Self::Unsatisfied(reason.into())
    }

    /// Returns `true` when the failure is a logical mismatch rather than a read error.
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Unsatisfied(_))
    }
}

impl From<kube::Error> for CheckFailure {
    fn from(err: kube::Error) -> Self {
        Self::Read(err.to_string())
    }
}

/// Terminal errors returned by the poll loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// Poll or consistency parameters violate their invariants
    ///
    /// Returned before the first tick, e.g. when `interval` is zero or larger than `timeout`.
    #[error("invalid wait configuration: {0}")]
    InvalidConfig(String),

    /// The deadline passed without the predicate succeeding
    ///
    /// Carries the most recent failure so the operator knows what was still wrong.
    #[error("timed out after {elapsed:?} ({attempts} attempts) waiting for {description}: {last}")]
    TimedOut {
        /// Description of the predicate being polled
        description: String,
        /// Number of evaluations performed
        attempts: u32,
        /// Wall-clock time since the first tick
        elapsed: Duration,
        /// Most recent failure reported by the predicate
        last: CheckFailure,
    },

    /// The surrounding run was cancelled before the predicate succeeded
    #[error("cancelled after {attempts} attempts waiting for {description}{}", last_suffix(.last))]
    Cancelled {
        /// Description of the predicate being polled
        description: String,
        /// Number of evaluations performed
        attempts: u32,
        /// Most recent failure, if any evaluation ran
        last: Option<CheckFailure>,
    },
}

impl WaitError {
    /// Returns the most recent predicate failure carried by this error, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<&CheckFailure> {
        match self {
            Self::TimedOut { last, .. } => Some(last),
            Self::Cancelled { last, .. } => last.as_ref(),
            Self::InvalidConfig(_) => None,
        }
    }

    /// Returns `true` for cancellation, as opposed to timeout or bad configuration.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

fn last_suffix(last: &Option<CheckFailure>) -> String {
    match last {
        Some(failure) => format!(" (last: {failure})"),
        None => String::new(),
    }
}

/// Errors raised while loading or validating the suite configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for `SuiteConfig`
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration parsed but violates an invariant
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<WaitError> for ConfigError {
    fn from(err: WaitError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Errors from one-shot create/delete steps.
///
/// These steps are not polled. `AlreadyExists` on create and `NotFound` on
/// delete are treated as success by the callers and never surface here.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A Kubernetes API call failed
    #[error("failed to {action}: {source}")]
    Kube {
        /// What the harness was trying to do (e.g. "create namespace e2e-abc")
        action: String,
        /// Underlying client error
        #[source]
        source: kube::Error,
    },

    /// A built-in manifest failed to deserialize into its API type
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
