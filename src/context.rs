// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Explicit per-run context.
//!
//! Every check builder and runner receives a `TestContext` instead of reading
//! shared process state. It carries:
//! - Kubernetes client for the cluster under test
//! - Cancellation token threaded through every predicate call and sleep
//! - Suite configuration

use crate::config::SuiteConfig;
use anyhow::{Context as _, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Context passed to every check.
#[derive(Clone)]
pub struct TestContext {
    /// Client for the workload cluster under test
    pub client: Client,

    /// Cancelled when the run is aborted (e.g. SIGINT)
    pub cancel: CancellationToken,

    /// Suite configuration
    pub config: Arc<SuiteConfig>,
}

impl TestContext {
    #[must_use]
    pub fn new(client: Client, config: SuiteConfig) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
            config: Arc::new(config),
        }
    }

    /// Replace the cancellation token, e.g. with one wired to a signal handler.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Build a Kubernetes client for the cluster under test.
///
/// - `kubeconfig` set: read that file
/// - only `context` set: use the default kubeconfig with that context
/// - neither: in-cluster config or the default kubeconfig
///
/// # Errors
///
/// Returns an error when the kubeconfig cannot be read or the client cannot be built.
pub async fn build_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match (kubeconfig, context) {
        (Some(path), _) => {
            debug!(path = %path.display(), "Loading kubeconfig file");
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        (None, Some(_)) => Config::from_kubeconfig(&options).await?,
        (None, None) => Config::infer().await?,
    };

    debug!(cluster_url = %config.cluster_url, "Kubernetes client configured");
    Ok(Client::try_from(config)?)
}
