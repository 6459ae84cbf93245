// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Predicate adapters over the Kubernetes API.
//!
//! Each adapter performs exactly one read per evaluation and never mutates the
//! cluster. Client errors become `CheckFailure::Read`; a successful read that
//! does not satisfy the condition becomes `CheckFailure::Unsatisfied`.
//!
//! The decision logic of every adapter is a pure `evaluate_*` function so it
//! can be tested without an API server.

pub mod conditions;
pub mod deletion;
pub mod nodes;
pub mod pods;
pub mod pvc;
pub mod workloads;

pub use conditions::{ConditionStatus, Target};
pub use deletion::ResourceDeleted;
pub use nodes::NodesReady;
pub use pods::PodsRunning;
pub use pvc::PvcBound;
pub use workloads::{WorkloadKind, WorkloadsReady};
