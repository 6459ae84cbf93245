// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use clap::Parser;
use cluster_e2e::{
    config::SuiteConfig,
    constants::CONFIG_ENV_VAR,
    context::{build_client, TestContext},
    metrics::gather_metrics,
    suite::run_suite,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Run the cluster readiness suite against a workload cluster.
#[derive(Parser, Debug)]
#[command(name = "cluster-e2e", version, about, rename_all = "kebab-case")]
struct Cli {
    /// Suite configuration file (YAML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: PathBuf,

    /// Kubeconfig for the cluster under test (defaults to in-cluster or ~/.kube/config)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Print Prometheus metrics to stdout after the run
    #[arg(long)]
    print_metrics: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("cluster-e2e")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging() {
    // Respects RUST_LOG if set, otherwise defaults to INFO level.
    // RUST_LOG_FORMAT=json switches to structured JSON output for CI log collectors.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();
    info!("Starting cluster e2e suite");

    let config = SuiteConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    debug!(provider = %config.provider, "Configuration loaded");

    let client = build_client(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let ctx = TestContext::new(client, config).with_cancel(cancel);
    let report = run_suite(&ctx).await?;
    report.log_summary();

    if cli.print_metrics {
        println!("{}", gather_metrics()?);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} checks did not pass",
            report.checks.len() - report.passed(),
            report.checks.len()
        );
    }

    info!("All checks passed");
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM so in-flight polls stop promptly.
async fn cancel_on_signal(token: CancellationToken) {
    if let Err(e) = wait_for_signal().await {
        error!("Failed to install signal handler: {e}");
        return;
    }
    warn!("Received shutdown signal, cancelling remaining checks");
    token.cancel();
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
