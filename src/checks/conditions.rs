// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition checks on arbitrary resources.
//!
//! Cluster API `Cluster`, cert-manager `Certificate` and `APIService` objects
//! all report health through `status.conditions`, so a single dynamic
//! predicate covers them.
//!
//! # Example
//!
//! ```rust,no_run
//! use cluster_e2e::checks::{ConditionStatus, Target};
//! use kube::Client;
//!
//! # async fn example(client: Client) {
//! let certificate = Target::new("cert-manager.io", "v1", "Certificate");
//! let ready = ConditionStatus::new(client, &certificate, Some("default"), "api-tls", "Ready");
//! # }
//! ```

use crate::constants::{CONDITION_STATUS_TRUE, HTTP_NOT_FOUND};
use crate::errors::CheckFailure;
use crate::wait::Predicate;
use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Group/version/kind of a resource looked up dynamically.
///
/// `plural` defaults to the lowercased kind with an `s` suffix, which holds for
/// every kind the suite checks by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// API group, empty for the core group
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
}

impl Target {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: None,
        }
    }

    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    #[must_use]
    pub fn plural(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| format!("{}s", self.kind.to_lowercase()))
    }

    #[must_use]
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural())
    }

    /// Build a dynamic API handle, namespaced when `namespace` is given.
    #[must_use]
    pub fn api(&self, client: Client, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = self.api_resource();
        match namespace {
            Some(ns) => Api::namespaced_with(client, ns, &ar),
            None => Api::all_with(client, &ar),
        }
    }

    /// Cluster API `Cluster` resource.
    #[must_use]
    pub fn capi_cluster() -> Self {
        Self::new("cluster.x-k8s.io", "v1beta1", "Cluster")
    }

    /// cert-manager `Certificate` resource.
    #[must_use]
    pub fn certificate() -> Self {
        Self::new("cert-manager.io", "v1", "Certificate")
    }

    /// Aggregated `APIService` resource.
    #[must_use]
    pub fn api_service() -> Self {
        Self::new("apiregistration.k8s.io", "v1", "APIService")
    }
}

/// A condition entry read from `status.conditions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCondition {
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// Find the condition of `condition_type` in a resource's `status.conditions`.
#[must_use]
pub fn find_condition(data: &Value, condition_type: &str) -> Option<ObservedCondition> {
    data.get("status")?
        .get("conditions")?
        .as_array()?
        .iter()
        .find(|c| c.get("type").and_then(Value::as_str) == Some(condition_type))
        .map(|c| ObservedCondition {
            status: c
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            reason: c.get("reason").and_then(Value::as_str).map(str::to_string),
            message: c.get("message").and_then(Value::as_str).map(str::to_string),
        })
}

/// # Errors
///
/// Returns `CheckFailure::Unsatisfied` when the condition is missing or has
/// another status. Reason and message are included for the operator.
pub fn evaluate_condition(
    data: &Value,
    condition_type: &str,
    expected_status: &str,
) -> Result<(), CheckFailure> {
    match find_condition(data, condition_type) {
        None => Err(CheckFailure::Unsatisfied(format!(
            "condition {condition_type} not reported yet"
        ))),
        Some(c) if c.status == expected_status => Ok(()),
        Some(c) => {
            let mut reason = format!("{condition_type}={} (want {expected_status})", c.status);
            if let Some(r) = c.reason {
                reason.push_str(&format!(", reason {r}"));
            }
            if let Some(m) = c.message {
                reason.push_str(&format!(": {m}"));
            }
            Err(CheckFailure::Unsatisfied(reason))
        }
    }
}

/// A named resource reports `condition_type` with the expected status.
pub struct ConditionStatus {
    api: Api<DynamicObject>,
    kind: String,
    namespace: Option<String>,
    name: String,
    condition_type: String,
}

impl ConditionStatus {
    /// Expects `condition_type` to be `True`.
    pub fn new(
        client: Client,
        target: &Target,
        namespace: Option<&str>,
        name: impl Into<String>,
        condition_type: impl Into<String>,
    ) -> Self {
        Self {
            api: target.api(client, namespace),
            kind: target.kind.clone(),
            namespace: namespace.map(str::to_string),
            name: name.into(),
            condition_type: condition_type.into(),
        }
    }

    fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[async_trait]
impl Predicate for ConditionStatus {
    fn describe(&self) -> String {
        format!(
            "{} {} {}={}",
            self.kind,
            self.qualified_name(),
            self.condition_type,
            CONDITION_STATUS_TRUE
        )
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        match self.api.get(&self.name).await {
            Ok(obj) => evaluate_condition(&obj.data, &self.condition_type, CONDITION_STATUS_TRUE),
            Err(kube::Error::Api(ae)) if ae.code == HTTP_NOT_FOUND => Err(
                CheckFailure::Unsatisfied(format!("{} {} not found", self.kind, self.qualified_name())),
            ),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod conditions_tests;
