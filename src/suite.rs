// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The shared check battery run against every workload cluster.
//!
//! Checks run strictly in order. A failed check does not stop the run, a
//! cancelled run does: once the token fires, the remaining checks are reported
//! as skipped.
//!
//! # Battery
//!
//! 1. Control plane nodes ready (not on EKS)
//! 2. Worker nodes ready, count within the configured range
//! 3. System Deployments, DaemonSets and StatefulSets ready (consistently)
//! 4. System pods running (consistently)
//! 5. Cluster resource `Ready` (optional)
//! 6. Configured certificates `Ready`
//! 7. Metrics API available (optional)
//! 8. Storage: a PVC binds and a pod mounts it, then everything is cleaned up

use crate::actions::{
    create_namespace, create_storage_probe, delete_namespace, delete_storage_probe,
    unique_namespace,
};
use crate::checks::{
    ConditionStatus, NodesReady, PodsRunning, PvcBound, ResourceDeleted, Target, WorkloadKind,
    WorkloadsReady,
};
use crate::config::{Provider, SuiteConfig};
use crate::constants::{
    CONDITION_AVAILABLE, CONDITION_READY, LABEL_MANAGED_BY, MANAGED_BY_VALUE,
    METRICS_API_SERVICE, NAMESPACE_DELETE_TIMEOUT_SECS, STORAGE_PROBE_PVC, TEST_NAMESPACE_PREFIX,
};
use crate::context::TestContext;
use crate::errors::{ConfigError, WaitError};
use crate::metrics::{
    record_check_cancelled, record_check_failed, record_check_passed, record_check_skipped,
};
use crate::wait::{
    poll_until, poll_until_consistent, ConsistencyConfig, PollConfig, PollSummary, Predicate,
};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Namespace, PersistentVolumeClaim};
use kube::Api;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How a check's predicate is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    Poll(PollConfig),
    Consistent {
        consistency: ConsistencyConfig,
        poll: PollConfig,
    },
}

/// A named predicate plus the way to wait for it.
pub struct Check {
    pub name: String,
    pub predicate: Box<dyn Predicate>,
    pub strategy: WaitStrategy,
}

impl Check {
    pub fn poll(name: impl Into<String>, predicate: impl Predicate + 'static, poll: PollConfig) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            strategy: WaitStrategy::Poll(poll),
        }
    }

    pub fn consistent(
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
        consistency: ConsistencyConfig,
        poll: PollConfig,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            strategy: WaitStrategy::Consistent { consistency, poll },
        }
    }

    /// Drive the predicate to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the poll loop's `WaitError` on timeout or cancellation.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<PollSummary, WaitError> {
        match &self.strategy {
            WaitStrategy::Poll(poll) => poll_until(cancel, self.predicate.as_ref(), poll).await,
            WaitStrategy::Consistent { consistency, poll } => {
                poll_until_consistent(cancel, self.predicate.as_ref(), consistency, poll).await
            }
        }
    }
}

/// Terminal outcome of one check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Passed { attempts: u32, elapsed: Duration },
    Failed { error: String },
    Cancelled { error: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub name: String,
    pub outcome: CheckOutcome,
}

impl CheckReport {
    pub fn failed(name: impl Into<String>, error: impl ToString) -> Self {
        let name = name.into();
        error!(check = %name, error = %error.to_string(), "Check failed");
        record_check_failed(&name, 0, Duration::ZERO);
        Self {
            name,
            outcome: CheckOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Passed { .. })
    }
}

/// Results of a full suite run.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub provider: Provider,
    pub cluster_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub checks: Vec<CheckReport>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            provider: config.provider,
            cluster_name: config.cluster_name.clone(),
            started_at: Utc::now(),
            checks: Vec::new(),
        }
    }

    fn count(&self, f: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.checks.iter().filter(|c| f(&c.outcome)).count()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Passed { .. }))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Cancelled { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Skipped { .. }))
    }

    /// Every check ran and passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.checks.is_empty() && self.passed() == self.checks.len()
    }

    /// Log one line per check and a summary line.
    pub fn log_summary(&self) {
        for check in &self.checks {
            match &check.outcome {
                CheckOutcome::Passed { attempts, elapsed } => {
                    info!(check = %check.name, attempts = attempts, elapsed = ?elapsed, "PASSED");
                }
                CheckOutcome::Failed { error } => {
                    error!(check = %check.name, error = %error, "FAILED");
                }
                CheckOutcome::Cancelled { error } => {
                    warn!(check = %check.name, error = %error, "CANCELLED");
                }
                CheckOutcome::Skipped { reason } => {
                    warn!(check = %check.name, reason = %reason, "SKIPPED");
                }
            }
        }
        info!(
            provider = %self.provider,
            cluster = self.cluster_name.as_deref().unwrap_or("-"),
            started_at = %self.started_at.to_rfc3339(),
            passed = self.passed(),
            failed = self.failed(),
            cancelled = self.cancelled(),
            skipped = self.skipped(),
            "Suite finished"
        );
    }
}

/// Run one check to completion and record its outcome.
pub async fn run_check(cancel: &CancellationToken, check: &Check) -> CheckReport {
    if cancel.is_cancelled() {
        record_check_skipped(&check.name);
        return CheckReport {
            name: check.name.clone(),
            outcome: CheckOutcome::Skipped {
                reason: "run cancelled".to_string(),
            },
        };
    }

    info!(check = %check.name, predicate = %check.predicate.describe(), "Running check");
    let start = Instant::now();

    let outcome = match check.run(cancel).await {
        Ok(summary) => {
            record_check_passed(&check.name, summary.attempts, summary.elapsed);
            CheckOutcome::Passed {
                attempts: summary.attempts,
                elapsed: summary.elapsed,
            }
        }
        Err(err) => {
            let attempts = match &err {
                WaitError::TimedOut { attempts, .. } | WaitError::Cancelled { attempts, .. } => {
                    *attempts
                }
                WaitError::InvalidConfig(_) => 0,
            };
            if err.is_cancelled() {
                record_check_cancelled(&check.name, attempts, start.elapsed());
                warn!(check = %check.name, error = %err, "Check cancelled");
                CheckOutcome::Cancelled {
                    error: err.to_string(),
                }
            } else {
                record_check_failed(&check.name, attempts, start.elapsed());
                error!(check = %check.name, error = %err, "Check failed");
                CheckOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    };

    CheckReport {
        name: check.name.clone(),
        outcome,
    }
}

/// Build the read-only part of the battery from configuration.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` when poll or consistency settings are invalid.
pub fn standard_checks(ctx: &TestContext) -> Result<Vec<Check>, ConfigError> {
    let config = &ctx.config;
    let client = &ctx.client;
    let poll = config.poll_config()?;
    let consistency = config.consistency_config()?;
    let system_ns = config.system_namespace.as_str();
    let mut checks = Vec::new();

    if config.provider.has_visible_control_plane() {
        if let Some(pool) = &config.control_plane {
            checks.push(Check::poll(
                "control-plane-nodes-ready",
                NodesReady::new(client.clone(), pool.control_plane_selector(), pool.count),
                config.pool_poll_config(pool)?,
            ));
        }
    }

    checks.push(Check::poll(
        "worker-nodes-ready",
        NodesReady::new(
            client.clone(),
            config.workers.worker_selector(),
            config.workers.count,
        ),
        config.pool_poll_config(&config.workers)?,
    ));

    for kind in WorkloadKind::ALL {
        checks.push(Check::consistent(
            format!("system-{}s-ready", kind.to_string().to_lowercase()),
            WorkloadsReady::new(client.clone(), system_ns, kind, ""),
            consistency,
            poll,
        ));
    }

    checks.push(Check::consistent(
        "system-pods-running",
        PodsRunning::new(client.clone(), system_ns, ""),
        consistency,
        poll,
    ));

    if let Some(resource) = &config.cluster_resource {
        checks.push(Check::poll(
            "cluster-resource-ready",
            ConditionStatus::new(
                client.clone(),
                &resource.target,
                resource.namespace.as_deref(),
                &resource.name,
                CONDITION_READY,
            ),
            poll,
        ));
    }

    for cert in &config.certificates {
        checks.push(Check::poll(
            format!("certificate-{}-{}-ready", cert.namespace, cert.name),
            ConditionStatus::new(
                client.clone(),
                &Target::certificate(),
                Some(&cert.namespace),
                &cert.name,
                CONDITION_READY,
            ),
            poll,
        ));
    }

    if config.metrics_api {
        checks.push(Check::poll(
            "metrics-api-available",
            ConditionStatus::new(
                client.clone(),
                &Target::api_service(),
                None,
                METRICS_API_SERVICE,
                CONDITION_AVAILABLE,
            ),
            poll,
        ));
    }

    Ok(checks)
}

/// Create a PVC and consuming pod in a scratch namespace, wait for them, then clean up.
///
/// Cleanup is attempted even when the binding checks fail.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` when poll settings are invalid.
pub async fn run_storage_scenario(
    ctx: &TestContext,
    checks: &mut Vec<CheckReport>,
) -> Result<(), ConfigError> {
    let poll = ctx.config.poll_config()?;
    let namespace_poll = PollConfig::new(
        Duration::from_secs(NAMESPACE_DELETE_TIMEOUT_SECS).max(poll.interval()),
        poll.interval(),
    )?;
    let client = &ctx.client;
    let namespace = unique_namespace(TEST_NAMESPACE_PREFIX);

    info!(namespace = %namespace, "Starting storage scenario");
    if let Err(e) = create_namespace(client, &namespace).await {
        checks.push(CheckReport::failed("storage-namespace-created", e));
        return Ok(());
    }

    let storage_class = ctx.config.storage.storage_class.as_deref();
    match create_storage_probe(client, &namespace, storage_class).await {
        Ok(()) => {
            let bound = Check::poll(
                "storage-pvc-bound",
                PvcBound::new(client.clone(), &namespace, STORAGE_PROBE_PVC),
                poll,
            );
            checks.push(run_check(&ctx.cancel, &bound).await);

            let mounted = Check::poll(
                "storage-pod-running",
                PodsRunning::new(
                    client.clone(),
                    &namespace,
                    format!("{LABEL_MANAGED_BY}={MANAGED_BY_VALUE}"),
                ),
                poll,
            );
            checks.push(run_check(&ctx.cancel, &mounted).await);
        }
        Err(e) => checks.push(CheckReport::failed("storage-probe-created", e)),
    }

    match delete_storage_probe(client, &namespace).await {
        Ok(()) => {
            let pvcs: Api<PersistentVolumeClaim> = Api::namespaced(client.clone(), &namespace);
            let gone = Check::poll(
                "storage-pvc-deleted",
                ResourceDeleted::new(pvcs, "PersistentVolumeClaim", STORAGE_PROBE_PVC),
                poll,
            );
            checks.push(run_check(&ctx.cancel, &gone).await);
        }
        Err(e) => checks.push(CheckReport::failed("storage-probe-deleted", e)),
    }

    match delete_namespace(client, &namespace).await {
        Ok(()) => {
            let namespaces: Api<Namespace> = Api::all(client.clone());
            let gone = Check::poll(
                "storage-namespace-deleted",
                ResourceDeleted::new(namespaces, "Namespace", &namespace),
                namespace_poll,
            );
            checks.push(run_check(&ctx.cancel, &gone).await);
        }
        Err(e) => checks.push(CheckReport::failed("storage-namespace-deleted", e)),
    }

    Ok(())
}

/// Run the full battery against the cluster in `ctx`.
///
/// # Errors
///
/// Returns `ConfigError` when the configuration cannot produce valid checks.
/// Check failures are reported in the `SuiteReport`, not as errors.
pub async fn run_suite(ctx: &TestContext) -> Result<SuiteReport, ConfigError> {
    let mut report = SuiteReport::new(&ctx.config);
    info!(
        provider = %report.provider,
        cluster = report.cluster_name.as_deref().unwrap_or("-"),
        "Starting cluster e2e suite"
    );

    for check in standard_checks(ctx)? {
        report.checks.push(run_check(&ctx.cancel, &check).await);
    }

    if ctx.config.storage.enabled {
        if ctx.cancel.is_cancelled() {
            record_check_skipped("storage");
            report.checks.push(CheckReport {
                name: "storage".to_string(),
                outcome: CheckOutcome::Skipped {
                    reason: "run cancelled".to_string(),
                },
            });
        } else {
            run_storage_scenario(ctx, &mut report.checks).await?;
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "suite_tests.rs"]
mod suite_tests;
