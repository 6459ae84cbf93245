// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Persistent volume claim binding check.

use crate::constants::{HTTP_NOT_FOUND, PVC_PHASE_BOUND};
use crate::errors::CheckFailure;
use crate::wait::Predicate;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::{Api, Client};
use tokio_util::sync::CancellationToken;

/// The named PVC exists and its phase is `Bound`.
pub struct PvcBound {
    api: Api<PersistentVolumeClaim>,
    namespace: String,
    name: String,
}

impl PvcBound {
    pub fn new(client: Client, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            api: Api::namespaced(client, &namespace),
            namespace,
            name: name.into(),
        }
    }
}

#[async_trait]
impl Predicate for PvcBound {
    fn describe(&self) -> String {
        format!("PVC {}/{} bound", self.namespace, self.name)
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        match self.api.get(&self.name).await {
            Ok(pvc) => {
                let phase = pvc
                    .status
                    .as_ref()
                    .and_then(|s| s.phase.as_deref())
                    .unwrap_or("Unknown");
                if phase == PVC_PHASE_BOUND {
                    Ok(())
                } else {
                    Err(CheckFailure::Unsatisfied(format!(
                        "PVC {}/{} is {phase}",
                        self.namespace, self.name
                    )))
                }
            }
            // Not found while waiting for existence is a mismatch, not a read error
            Err(kube::Error::Api(ae)) if ae.code == HTTP_NOT_FOUND => Err(
                CheckFailure::Unsatisfied(format!("PVC {}/{} not found", self.namespace, self.name)),
            ),
            Err(e) => Err(e.into()),
        }
    }
}
