// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # cluster-e2e - Readiness checks for Kubernetes workload clusters
//!
//! `cluster-e2e` verifies that a freshly provisioned workload cluster is
//! actually usable: nodes joined and ready, system workloads settled, the
//! metrics API serving and storage provisioning working end to end.
//!
//! ## Overview
//!
//! Every check is a [`wait::Predicate`]. It performs one fresh read of
//! cluster state and reports success or a failure reason. Predicates are
//! driven by a poll loop with a fixed interval and a hard deadline. They can
//! optionally be wrapped so that several consecutive successes are required.
//! This filters out workloads that flap between ready and not ready while a
//! cluster settles.
//!
//! ## Modules
//!
//! - [`wait`] - Predicate abstraction, poll loop, consistency wrapper, count ranges
//! - [`checks`] - Kubernetes predicates (nodes, workloads, pods, PVCs, conditions, deletion)
//! - [`actions`] - One-shot create/delete steps used by the storage scenario
//! - [`suite`] - The shared check battery and its report
//! - [`config`] - YAML suite configuration
//! - [`context`] - Per-run context (client, cancellation token, configuration)
//! - [`errors`] - Error types
//! - [`metrics`] - Prometheus metrics for check outcomes
//!
//! ## Example
//!
//! ```rust,no_run
//! use cluster_e2e::config::SuiteConfig;
//! use cluster_e2e::context::{build_client, TestContext};
//! use cluster_e2e::suite::run_suite;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SuiteConfig::from_file("suite.yaml")?;
//! let client = build_client(None, None).await?;
//! let ctx = TestContext::new(client, config);
//!
//! let report = run_suite(&ctx).await?;
//! report.log_summary();
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod checks;
pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod metrics;
pub mod suite;
pub mod wait;
