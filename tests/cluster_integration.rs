// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests against a live cluster.
//!
//! These use the current kubeconfig context and create short-lived
//! namespaces prefixed with `e2e-`.
//!
//! Run with: cargo test --test cluster_integration -- --ignored

mod common;

use cluster_e2e::actions::{create_namespace, delete_namespace, unique_namespace};
use cluster_e2e::checks::{NodesReady, PodsRunning, ResourceDeleted};
use cluster_e2e::config::SuiteConfig;
use cluster_e2e::context::TestContext;
use cluster_e2e::suite::{run_storage_scenario, CheckReport};
use cluster_e2e::wait::{poll_until, poll_until_consistent, ConsistencyConfig, CountRange, PollConfig};
use common::get_kube_client_or_skip;
use k8s_openapi::api::core::v1::Namespace;
use kube::Api;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const LIVE_CONFIG: &str = r"
provider: eks
workers:
  selector: ''
  count: { min: 1, max: 1000 }
";

fn poll(timeout_secs: u64) -> PollConfig {
    PollConfig::new(Duration::from_secs(timeout_secs), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_any_node_ready() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let check = NodesReady::new(client, "", CountRange::new(1, 1000).unwrap());
    let summary = poll_until(&CancellationToken::new(), &check, &poll(60))
        .await
        .unwrap();

    println!("✓ Nodes ready after {} attempts", summary.attempts);
}

#[tokio::test]
#[ignore]
async fn test_system_pods_consistently_running() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let check = PodsRunning::new(client, "kube-system", "");
    let consistency = ConsistencyConfig::new(3, Duration::from_secs(1)).unwrap();

    poll_until_consistent(&CancellationToken::new(), &check, &consistency, &poll(120))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn test_namespace_create_and_delete() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let name = unique_namespace("e2e-it");
    create_namespace(&client, &name).await.unwrap();
    // Creating twice is tolerated
    create_namespace(&client, &name).await.unwrap();

    delete_namespace(&client, &name).await.unwrap();
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let gone = ResourceDeleted::new(namespaces, "Namespace", &name);
    poll_until(&CancellationToken::new(), &gone, &poll(300))
        .await
        .unwrap();

    // Deleting a missing namespace is tolerated
    delete_namespace(&client, &name).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_storage_scenario_with_default_class() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let config = SuiteConfig::from_yaml(LIVE_CONFIG).unwrap();
    let ctx = TestContext::new(client, config);

    let mut reports: Vec<CheckReport> = Vec::new();
    run_storage_scenario(&ctx, &mut reports).await.unwrap();

    for report in &reports {
        println!("{}: {:?}", report.name, report.outcome);
    }
    assert!(reports.iter().all(CheckReport::is_passed));
}
