// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pod health checks.
//!
//! Usually wrapped in [`crate::wait::Consistently`]: a crash-looping pod is
//! briefly `Running` with ready containers between restarts.

use crate::constants::{POD_PHASE_RUNNING, POD_PHASE_SUCCEEDED};
use crate::errors::CheckFailure;
use crate::wait::Predicate;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tokio_util::sync::CancellationToken;

/// Every pod in `namespace` matching `selector` is running with all containers
/// ready, or has completed successfully.
pub struct PodsRunning {
    api: Api<Pod>,
    namespace: String,
    selector: String,
}

impl PodsRunning {
    pub fn new(client: Client, namespace: impl Into<String>, selector: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            api: Api::namespaced(client, &namespace),
            namespace,
            selector: selector.into(),
        }
    }
}

#[async_trait]
impl Predicate for PodsRunning {
    fn describe(&self) -> String {
        if self.selector.is_empty() {
            format!("pods in {} running", self.namespace)
        } else {
            format!("pods in {} matching '{}' running", self.namespace, self.selector)
        }
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        let pods = self
            .api
            .list(&ListParams::default().labels(&self.selector))
            .await?;
        evaluate_pods(&pods.items)
    }
}

#[must_use]
pub fn pod_phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown")
}

/// `Succeeded`, or `Running` with every container reporting ready.
#[must_use]
pub fn is_pod_healthy(pod: &Pod) -> bool {
    match pod_phase(pod) {
        POD_PHASE_SUCCEEDED => true,
        POD_PHASE_RUNNING => pod
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref())
            .is_some_and(|statuses| !statuses.is_empty() && statuses.iter().all(|c| c.ready)),
        _ => false,
    }
}

/// # Errors
///
/// Returns `CheckFailure::Unsatisfied` when no pods match or any pod is unhealthy.
pub fn evaluate_pods(pods: &[Pod]) -> Result<(), CheckFailure> {
    if pods.is_empty() {
        return Err(CheckFailure::unsatisfied("no pods match"));
    }

    let unhealthy: Vec<String> = pods
        .iter()
        .filter(|p| !is_pod_healthy(p))
        .map(|p| format!("{} ({})", p.name_any(), pod_phase(p)))
        .collect();

    if unhealthy.is_empty() {
        Ok(())
    } else {
        Err(CheckFailure::Unsatisfied(format!(
            "{} of {} pods not running: {}",
            unhealthy.len(),
            pods.len(),
            unhealthy.join(", ")
        )))
    }
}

#[cfg(test)]
#[path = "pods_tests.rs"]
mod pods_tests;
