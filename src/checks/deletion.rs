// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deletion confirmation.
//!
//! Here a `404 Not Found` is the success case: the resource is gone. Every
//! other predicate treats "not found" as a failure.

use crate::constants::HTTP_NOT_FOUND;
use crate::errors::CheckFailure;
use crate::wait::Predicate;
use async_trait::async_trait;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// The named resource no longer exists.
pub struct ResourceDeleted<K> {
    api: Api<K>,
    kind: String,
    name: String,
}

impl<K> ResourceDeleted<K> {
    /// `kind` is only used in messages; `api` decides the scope and type of the lookup.
    pub fn new(api: Api<K>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api,
            kind: kind.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl<K> Predicate for ResourceDeleted<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    fn describe(&self) -> String {
        format!("{} {} deleted", self.kind, self.name)
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        match self.api.get(&self.name).await {
            Ok(obj) => {
                let state = if obj.meta().deletion_timestamp.is_some() {
                    "is still terminating"
                } else {
                    "still exists"
                };
                Err(CheckFailure::Unsatisfied(format!(
                    "{} {} {state}",
                    self.kind, self.name
                )))
            }
            Err(kube::Error::Api(ae)) if ae.code == HTTP_NOT_FOUND => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
