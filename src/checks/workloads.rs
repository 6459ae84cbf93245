// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Readiness of Deployments, DaemonSets and StatefulSets.
//!
//! A workload is ready when every desired replica reports ready. An empty
//! selection passes: not every cluster runs StatefulSets in `kube-system`.

use crate::errors::CheckFailure;
use crate::wait::Predicate;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Workload controllers covered by [`WorkloadsReady`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 3] = [Self::Deployment, Self::DaemonSet, Self::StatefulSet];
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deployment => "Deployment",
            Self::DaemonSet => "DaemonSet",
            Self::StatefulSet => "StatefulSet",
        };
        f.write_str(s)
    }
}

/// Desired vs. ready replicas of a single workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub name: String,
    pub desired: i32,
    pub ready: i32,
}

impl Readiness {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready >= self.desired
    }
}

#[must_use]
pub fn deployment_readiness(deployment: &Deployment) -> Readiness {
    Readiness {
        name: deployment.name_any(),
        desired: deployment
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1),
        ready: deployment
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0),
    }
}

#[must_use]
pub fn daemonset_readiness(daemonset: &DaemonSet) -> Readiness {
    let (desired, ready) = daemonset
        .status
        .as_ref()
        .map_or((0, 0), |s| (s.desired_number_scheduled, s.number_ready));
    Readiness {
        name: daemonset.name_any(),
        desired,
        ready,
    }
}

#[must_use]
pub fn statefulset_readiness(statefulset: &StatefulSet) -> Readiness {
    Readiness {
        name: statefulset.name_any(),
        desired: statefulset
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(1),
        ready: statefulset
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0),
    }
}

/// Fail with the list of workloads that are missing ready replicas.
///
/// # Errors
///
/// Returns `CheckFailure::Unsatisfied` naming each lagging workload.
pub fn evaluate_workloads(kind: WorkloadKind, items: &[Readiness]) -> Result<(), CheckFailure> {
    let lagging: Vec<String> = items
        .iter()
        .filter(|r| !r.is_ready())
        .map(|r| format!("{} ({}/{})", r.name, r.ready, r.desired))
        .collect();

    if lagging.is_empty() {
        return Ok(());
    }

    Err(CheckFailure::Unsatisfied(format!(
        "{} of {} {kind}s not ready: {}",
        lagging.len(),
        items.len(),
        lagging.join(", ")
    )))
}

/// All workloads of one kind in `namespace` matching `selector` are ready.
pub struct WorkloadsReady {
    client: Client,
    namespace: String,
    kind: WorkloadKind,
    selector: String,
}

impl WorkloadsReady {
    pub fn new(
        client: Client,
        namespace: impl Into<String>,
        kind: WorkloadKind,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            kind,
            selector: selector.into(),
        }
    }

    async fn readiness(&self) -> Result<Vec<Readiness>, kube::Error> {
        let lp = ListParams::default().labels(&self.selector);
        let items = match self.kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
                let list = api.list(&lp).await?;
                list.items.iter().map(deployment_readiness).collect()
            }
            WorkloadKind::DaemonSet => {
                let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
                let list = api.list(&lp).await?;
                list.items.iter().map(daemonset_readiness).collect()
            }
            WorkloadKind::StatefulSet => {
                let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), &self.namespace);
                let list = api.list(&lp).await?;
                list.items.iter().map(statefulset_readiness).collect()
            }
        };
        Ok(items)
    }
}

#[async_trait]
impl Predicate for WorkloadsReady {
    fn describe(&self) -> String {
        if self.selector.is_empty() {
            format!("{}s in {} ready", self.kind, self.namespace)
        } else {
            format!(
                "{}s in {} matching '{}' ready",
                self.kind, self.namespace, self.selector
            )
        }
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        let items = self.readiness().await?;
        evaluate_workloads(self.kind, &items)
    }
}

#[cfg(test)]
#[path = "workloads_tests.rs"]
mod workloads_tests;
