// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the cluster e2e harness.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Polling Defaults
// ============================================================================

/// Default overall timeout for a polled check (15 minutes)
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 900;

/// Default interval between poll ticks (10 seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default number of consecutive successes for consistency-wrapped checks
pub const DEFAULT_REQUIRED_SUCCESSES: u32 = 3;

/// Default delay between consecutive consistency checks (5 seconds)
pub const DEFAULT_CONSISTENCY_DELAY_SECS: u64 = 5;

/// Failed ticks between `warn!` lines while a check is still converging
pub const POLL_WARN_EVERY_ATTEMPTS: u32 = 5;

/// Timeout for namespace deletion to complete (5 minutes)
pub const NAMESPACE_DELETE_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// Kubernetes Conventions
// ============================================================================

/// Condition type reported by nodes and most CRDs when healthy
pub const CONDITION_READY: &str = "Ready";

/// Condition type reported by `APIService` objects
pub const CONDITION_AVAILABLE: &str = "Available";

/// Condition status value for a satisfied condition
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Pod phase for a running pod
pub const POD_PHASE_RUNNING: &str = "Running";

/// Pod phase for a pod that ran to completion
pub const POD_PHASE_SUCCEEDED: &str = "Succeeded";

/// PVC phase once bound to a volume
pub const PVC_PHASE_BOUND: &str = "Bound";

/// HTTP status code for "Not Found"
pub const HTTP_NOT_FOUND: u16 = 404;

/// HTTP status code for "Conflict" (resource already exists)
pub const HTTP_CONFLICT: u16 = 409;

// ============================================================================
// Node Selectors
// ============================================================================

/// Default label selector for control plane nodes
pub const DEFAULT_CONTROL_PLANE_SELECTOR: &str = "node-role.kubernetes.io/control-plane";

/// Default label selector for worker nodes
pub const DEFAULT_WORKER_SELECTOR: &str = "!node-role.kubernetes.io/control-plane";

/// Default namespace holding cluster system workloads
pub const DEFAULT_SYSTEM_NAMESPACE: &str = "kube-system";

// ============================================================================
// Test Resources
// ============================================================================

/// Prefix for namespaces created by the harness
pub const TEST_NAMESPACE_PREFIX: &str = "e2e";

/// Label key marking resources created by the harness
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Label value marking resources created by the harness
pub const MANAGED_BY_VALUE: &str = "cluster-e2e";

/// Name of the storage probe PVC
pub const STORAGE_PROBE_PVC: &str = "storage-probe";

/// Name of the pod that mounts the storage probe PVC
pub const STORAGE_PROBE_POD: &str = "storage-probe";

/// Image used by the storage probe pod
pub const STORAGE_PROBE_IMAGE: &str = "busybox:1.36";

/// Requested size of the storage probe PVC
pub const STORAGE_PROBE_SIZE: &str = "1Gi";

/// Maximum length of a Kubernetes namespace name (DNS-1123 label)
pub const MAX_NAMESPACE_LEN: usize = 63;

// ============================================================================
// Metrics API
// ============================================================================

/// `APIService` name registered by metrics-server
pub const METRICS_API_SERVICE: &str = "v1beta1.metrics.k8s.io";

/// Environment variable holding the default config path
pub const CONFIG_ENV_VAR: &str = "CLUSTER_E2E_CONFIG";
