// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Node readiness checks.
//!
//! Control plane pools have a fixed size; worker pools may autoscale, so the
//! expected count is a [`CountRange`].

use crate::constants::{CONDITION_READY, CONDITION_STATUS_TRUE};
use crate::errors::CheckFailure;
use crate::wait::{CountRange, Predicate};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tokio_util::sync::CancellationToken;

/// Nodes matching `selector` are `Ready` and their count is within `expected`.
pub struct NodesReady {
    api: Api<Node>,
    selector: String,
    expected: CountRange,
}

impl NodesReady {
    pub fn new(client: Client, selector: impl Into<String>, expected: CountRange) -> Self {
        Self {
            api: Api::all(client),
            selector: selector.into(),
            expected,
        }
    }
}

#[async_trait]
impl Predicate for NodesReady {
    fn describe(&self) -> String {
        format!(
            "{} nodes matching '{}' Ready",
            self.expected, self.selector
        )
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        let nodes = self
            .api
            .list(&ListParams::default().labels(&self.selector))
            .await?;
        evaluate_nodes(&nodes.items, &self.selector, self.expected)
    }
}

/// Returns `true` when the node's `Ready` condition is `True`.
#[must_use]
pub fn is_node_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == CONDITION_READY && c.status == CONDITION_STATUS_TRUE)
        })
}

/// Compare the listed nodes against the expected count.
///
/// The ready count must fall inside `expected`. For an exact range every
/// selected node must also be ready, so a stray `NotReady` node fails the check.
///
/// # Errors
///
/// Returns `CheckFailure::Unsatisfied` describing the mismatch.
pub fn evaluate_nodes(
    nodes: &[Node],
    selector: &str,
    expected: CountRange,
) -> Result<(), CheckFailure> {
    let total = count(nodes.len());
    let ready = count(nodes.iter().filter(|n| is_node_ready(n)).count());

    if expected.contains(ready) && (!expected.is_exact() || ready == total) {
        return Ok(());
    }

    let not_ready: Vec<String> = nodes
        .iter()
        .filter(|n| !is_node_ready(n))
        .map(|n| n.name_any())
        .collect();

    let mut reason =
        format!("{ready}/{total} nodes matching '{selector}' are Ready, expected {expected}");
    if !not_ready.is_empty() {
        reason.push_str(&format!(" (not ready: {})", not_ready.join(", ")));
    }
    Err(CheckFailure::Unsatisfied(reason))
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod nodes_tests;
