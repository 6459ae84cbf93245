// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One-shot create/delete steps used by the check battery.
//!
//! These are not polled. Creating something that already exists and deleting
//! something already gone both count as success, so a retried suite run does
//! not trip over leftovers from a previous attempt. Convergence after each
//! step is confirmed separately with a predicate (`PvcBound`, `ResourceDeleted`).

use crate::constants::{
    HTTP_CONFLICT, HTTP_NOT_FOUND, LABEL_MANAGED_BY, MANAGED_BY_VALUE, MAX_NAMESPACE_LEN,
    STORAGE_PROBE_IMAGE, STORAGE_PROBE_POD, STORAGE_PROBE_PVC, STORAGE_PROBE_SIZE,
};
use crate::errors::ActionError;
use chrono::Utc;
use k8s_openapi::api::core::v1::{Namespace, PersistentVolumeClaim, Pod};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt::Debug;
use tracing::{debug, info};

/// A DNS-1123 namespace name unique to this process and moment.
#[must_use]
pub fn unique_namespace(prefix: &str) -> String {
    let suffix = format!(
        "{}-{}",
        std::process::id(),
        Utc::now().format("%H%M%S%3f")
    );
    let mut name = format!("{}-{suffix}", prefix.to_lowercase());
    name.retain(|c| c.is_ascii_alphanumeric() || c == '-');
    name.truncate(MAX_NAMESPACE_LEN);
    name.trim_matches('-').to_string()
}

/// Create a namespace labelled as managed by the harness.
///
/// # Errors
///
/// Returns `ActionError::Kube` for any API error except `409 AlreadyExists`.
pub async fn create_namespace(client: &Client, name: &str) -> Result<(), ActionError> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns: Namespace = from_manifest(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": { LABEL_MANAGED_BY: MANAGED_BY_VALUE }
        }
    }))?;

    create(&namespaces, &ns, &format!("create namespace {name}")).await
}

/// Delete a namespace, tolerating `404 NotFound`.
///
/// # Errors
///
/// Returns `ActionError::Kube` for any other API error.
pub async fn delete_namespace(client: &Client, name: &str) -> Result<(), ActionError> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    delete(
        &namespaces,
        name,
        &DeleteParams::default(),
        &format!("delete namespace {name}"),
    )
    .await
}

/// Create a PVC and a pod mounting it.
///
/// The pod is required for storage classes with `WaitForFirstConsumer` binding.
/// `storage_class` of `None` uses the cluster default.
///
/// # Errors
///
/// Returns `ActionError::Kube` for any API error except `409 AlreadyExists`.
pub async fn create_storage_probe(
    client: &Client,
    namespace: &str,
    storage_class: Option<&str>,
) -> Result<(), ActionError> {
    let pvcs: Api<PersistentVolumeClaim> = Api::namespaced(client.clone(), namespace);
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);

    create(
        &pvcs,
        &storage_probe_pvc(storage_class)?,
        &format!("create PVC {namespace}/{STORAGE_PROBE_PVC}"),
    )
    .await?;
    create(
        &pods,
        &storage_probe_pod()?,
        &format!("create pod {namespace}/{STORAGE_PROBE_POD}"),
    )
    .await
}

/// Delete the storage probe pod and PVC, tolerating `404 NotFound`.
///
/// # Errors
///
/// Returns `ActionError::Kube` for any other API error.
pub async fn delete_storage_probe(client: &Client, namespace: &str) -> Result<(), ActionError> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pvcs: Api<PersistentVolumeClaim> = Api::namespaced(client.clone(), namespace);

    let immediate = DeleteParams {
        grace_period_seconds: Some(0),
        ..Default::default()
    };
    delete(
        &pods,
        STORAGE_PROBE_POD,
        &immediate,
        &format!("delete pod {namespace}/{STORAGE_PROBE_POD}"),
    )
    .await?;
    delete(
        &pvcs,
        STORAGE_PROBE_PVC,
        &DeleteParams::default(),
        &format!("delete PVC {namespace}/{STORAGE_PROBE_PVC}"),
    )
    .await
}

/// PVC manifest for the storage probe.
///
/// # Errors
///
/// Returns `ActionError::Manifest` if the manifest does not match the API schema.
pub fn storage_probe_pvc(storage_class: Option<&str>) -> Result<PersistentVolumeClaim, ActionError> {
    let mut manifest = json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": {
            "name": STORAGE_PROBE_PVC,
            "labels": { LABEL_MANAGED_BY: MANAGED_BY_VALUE }
        },
        "spec": {
            "accessModes": ["ReadWriteOnce"],
            "resources": { "requests": { "storage": STORAGE_PROBE_SIZE } }
        }
    });
    if let Some(class) = storage_class {
        manifest["spec"]["storageClassName"] = json!(class);
    }
    from_manifest(manifest)
}

/// Pod manifest mounting the storage probe PVC.
///
/// # Errors
///
/// Returns `ActionError::Manifest` if the manifest does not match the API schema.
pub fn storage_probe_pod() -> Result<Pod, ActionError> {
    from_manifest(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": STORAGE_PROBE_POD,
            "labels": { LABEL_MANAGED_BY: MANAGED_BY_VALUE }
        },
        "spec": {
            "restartPolicy": "Never",
            "containers": [{
                "name": "probe",
                "image": STORAGE_PROBE_IMAGE,
                "command": ["sh", "-c", "echo ok > /data/probe && sleep 3600"],
                "volumeMounts": [{ "name": "data", "mountPath": "/data" }]
            }],
            "volumes": [{
                "name": "data",
                "persistentVolumeClaim": { "claimName": STORAGE_PROBE_PVC }
            }]
        }
    }))
}

fn from_manifest<K: DeserializeOwned>(manifest: serde_json::Value) -> Result<K, ActionError> {
    Ok(serde_json::from_value(manifest)?)
}

async fn create<K>(api: &Api<K>, obj: &K, action: &str) -> Result<(), ActionError>
where
    K: Resource + Clone + DeserializeOwned + serde::Serialize + Debug,
{
    match api.create(&PostParams::default(), obj).await {
        Ok(_) => {
            info!(action = action, "Created");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == HTTP_CONFLICT => {
            debug!(action = action, "Already exists");
            Ok(())
        }
        Err(source) => Err(ActionError::Kube {
            action: action.to_string(),
            source,
        }),
    }
}

async fn delete<K>(
    api: &Api<K>,
    name: &str,
    dp: &DeleteParams,
    action: &str,
) -> Result<(), ActionError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    match api.delete(name, dp).await {
        Ok(_) => {
            info!(action = action, "Deletion requested");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == HTTP_NOT_FOUND => {
            debug!(action = action, "Already deleted");
            Ok(())
        }
        Err(source) => Err(ActionError::Kube {
            action: action.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod actions_tests;
