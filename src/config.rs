// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Suite configuration.
//!
//! The harness reads a YAML file describing what the cluster under test is
//! expected to look like. Every field except `provider` and `workers` has a
//! default.
//!
//! # Example
//!
//! ```yaml
//! provider: aws
//! clusterName: e2e-abc12
//! polling:
//!   timeoutSecs: 900
//!   intervalSecs: 10
//! controlPlane:
//!   count: { min: 3, max: 3 }
//! workers:
//!   selector: "node-role.kubernetes.io/worker"
//!   count: { min: 2, max: 10 }
//! clusterResource:
//!   group: cluster.x-k8s.io
//!   version: v1beta1
//!   kind: Cluster
//!   namespace: org-e2e
//!   name: e2e-abc12
//! certificates:
//!   - namespace: kube-system
//!     name: ingress-tls
//! storage:
//!   storageClass: gp3
//! ```

use crate::checks::Target;
use crate::constants::{
    DEFAULT_CONSISTENCY_DELAY_SECS, DEFAULT_CONTROL_PLANE_SELECTOR, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_REQUIRED_SUCCESSES, DEFAULT_SYSTEM_NAMESPACE,
    DEFAULT_WORKER_SELECTOR,
};
use crate::errors::ConfigError;
use crate::wait::{ConsistencyConfig, CountRange, PollConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Infrastructure provider the cluster was created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Aws,
    Vsphere,
    CloudDirector,
    Azure,
    Eks,
}

impl Provider {
    /// Managed control planes (EKS) do not register control plane nodes.
    #[must_use]
    pub fn has_visible_control_plane(&self) -> bool {
        !matches!(self, Self::Eks)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Aws => "aws",
            Self::Vsphere => "vsphere",
            Self::CloudDirector => "cloud-director",
            Self::Azure => "azure",
            Self::Eks => "eks",
        };
        f.write_str(s)
    }
}

/// Poll loop defaults applied to every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Consistency window for checks that must hold steadily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencySettings {
    #[serde(default = "default_required_successes")]
    pub required_successes: u32,
    #[serde(default = "default_consistency_delay_secs")]
    pub delay_secs: u64,
}

impl Default for ConsistencySettings {
    fn default() -> Self {
        Self {
            required_successes: DEFAULT_REQUIRED_SUCCESSES,
            delay_secs: DEFAULT_CONSISTENCY_DELAY_SECS,
        }
    }
}

/// Expected shape of a node pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSettings {
    /// Label selector matching the pool's nodes
    #[serde(default)]
    pub selector: Option<String>,
    /// Acceptable number of ready nodes
    pub count: CountRange,
    /// Overrides `polling.timeoutSecs` for this pool (e.g. slow autoscaling)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// A resource whose `Ready` condition must be `True`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceSettings {
    #[serde(flatten)]
    pub target: Target,
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
}

/// A namespaced object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

/// Storage scenario settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `None` uses the cluster's default storage class
    #[serde(default)]
    pub storage_class: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            storage_class: None,
        }
    }
}

/// Top-level suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    pub provider: Provider,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub consistency: ConsistencySettings,
    /// Required unless the provider manages the control plane
    #[serde(default)]
    pub control_plane: Option<NodePoolSettings>,
    pub workers: NodePoolSettings,
    #[serde(default = "default_system_namespace")]
    pub system_namespace: String,
    #[serde(default)]
    pub cluster_resource: Option<ClusterResourceSettings>,
    #[serde(default)]
    pub certificates: Vec<NamespacedName>,
    /// Check that the metrics API (`metrics-server`) is available
    #[serde(default = "default_true")]
    pub metrics_api: bool,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl SuiteConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.poll_config()?;
        self.consistency_config()?;
        self.pool_poll_config(&self.workers)?;

        match (&self.control_plane, self.provider.has_visible_control_plane()) {
            (None, true) => {
                return Err(ConfigError::Invalid(format!(
                    "controlPlane is required for provider {}",
                    self.provider
                )))
            }
            (Some(pool), _) => {
                self.pool_poll_config(pool)?;
            }
            (None, false) => {}
        }

        if self.system_namespace.is_empty() {
            return Err(ConfigError::Invalid(
                "systemNamespace must not be empty".to_string(),
            ));
        }
        if let Some(resource) = &self.cluster_resource {
            if resource.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "clusterResource.name must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Default poll loop parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when the interval is zero or exceeds the timeout.
    pub fn poll_config(&self) -> Result<PollConfig, ConfigError> {
        Ok(PollConfig::new(
            Duration::from_secs(self.polling.timeout_secs),
            Duration::from_secs(self.polling.interval_secs),
        )?)
    }

    /// Poll loop parameters for a node pool, honouring its timeout override.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when the resulting parameters are invalid.
    pub fn pool_poll_config(&self, pool: &NodePoolSettings) -> Result<PollConfig, ConfigError> {
        let timeout = pool.timeout_secs.unwrap_or(self.polling.timeout_secs);
        Ok(PollConfig::new(
            Duration::from_secs(timeout),
            Duration::from_secs(self.polling.interval_secs),
        )?)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `requiredSuccesses` is zero.
    pub fn consistency_config(&self) -> Result<ConsistencyConfig, ConfigError> {
        Ok(ConsistencyConfig::new(
            self.consistency.required_successes,
            Duration::from_secs(self.consistency.delay_secs),
        )?)
    }
}

impl NodePoolSettings {
    /// The pool's selector, or `default` when none is configured.
    #[must_use]
    pub fn selector_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.selector.as_deref().unwrap_or(default)
    }

    #[must_use]
    pub fn control_plane_selector(&self) -> &str {
        self.selector_or(DEFAULT_CONTROL_PLANE_SELECTOR)
    }

    #[must_use]
    pub fn worker_selector(&self) -> &str {
        self.selector_or(DEFAULT_WORKER_SELECTOR)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_POLL_TIMEOUT_SECS
}

fn default_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_required_successes() -> u32 {
    DEFAULT_REQUIRED_SUCCESSES
}

fn default_consistency_delay_secs() -> u64 {
    DEFAULT_CONSISTENCY_DELAY_SECS
}

fn default_system_namespace() -> String {
    DEFAULT_SYSTEM_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
