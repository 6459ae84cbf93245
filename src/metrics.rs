// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for suite runs.
//!
//! All metrics use the namespace prefix `cluster_e2e_`. The CLI can print the
//! text exposition after a run (`--print-metrics`) so CI jobs can scrape
//! check durations and attempt counts from the job log.
//!
//! # Example
//!
//! ```rust,no_run
//! use cluster_e2e::metrics::{gather_metrics, record_check_passed};
//!
//! record_check_passed("worker-nodes-ready", 4, std::time::Duration::from_secs(30));
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all harness metrics
const METRICS_NAMESPACE: &str = "cluster_e2e";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of checks by name and outcome
///
/// Labels:
/// - `check`: Check name (e.g., `control-plane-nodes-ready`)
/// - `outcome`: `passed`, `failed`, `cancelled` or `skipped`
pub static CHECKS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_checks_total"),
        "Total number of checks by name and outcome",
    );
    let counter = CounterVec::new(opts, &["check", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Time from the first poll tick until a check resolved, in seconds
pub static CHECK_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_check_duration_seconds"),
        "Duration of checks in seconds by name",
    )
    .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1800.0]);
    let histogram = HistogramVec::new(opts, &["check"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of predicate evaluations by check name
pub static POLL_ATTEMPTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_poll_attempts_total"),
        "Total number of predicate evaluations by check name",
    );
    let counter = CounterVec::new(opts, &["check"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

pub fn record_check_passed(check: &str, attempts: u32, duration: Duration) {
    CHECKS_TOTAL.with_label_values(&[check, "passed"]).inc();
    CHECK_DURATION_SECONDS
        .with_label_values(&[check])
        .observe(duration.as_secs_f64());
    POLL_ATTEMPTS_TOTAL
        .with_label_values(&[check])
        .inc_by(f64::from(attempts));
}

pub fn record_check_failed(check: &str, attempts: u32, duration: Duration) {
    CHECKS_TOTAL.with_label_values(&[check, "failed"]).inc();
    CHECK_DURATION_SECONDS
        .with_label_values(&[check])
        .observe(duration.as_secs_f64());
    POLL_ATTEMPTS_TOTAL
        .with_label_values(&[check])
        .inc_by(f64::from(attempts));
}

/// A check interrupted by cancellation, counted apart from timeouts.
pub fn record_check_cancelled(check: &str, attempts: u32, duration: Duration) {
    CHECKS_TOTAL.with_label_values(&[check, "cancelled"]).inc();
    CHECK_DURATION_SECONDS
        .with_label_values(&[check])
        .observe(duration.as_secs_f64());
    POLL_ATTEMPTS_TOTAL
        .with_label_values(&[check])
        .inc_by(f64::from(attempts));
}

pub fn record_check_skipped(check: &str) {
    CHECKS_TOTAL.with_label_values(&[check, "skipped"]).inc();
}

/// Gather all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
