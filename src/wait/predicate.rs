// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The `Predicate` trait and its generic adapters.
//!
//! A predicate is a repeatable, read-only check of external state. Each call
//! performs a fresh read; nothing is cached between calls. Implementations for
//! Kubernetes objects live in [`crate::checks`].

use crate::errors::CheckFailure;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A no-argument check of external state.
///
/// `Ok(())` means the condition holds. Any `Err` is retryable from the poll
/// loop's point of view; see [`CheckFailure`] for the taxonomy.
///
/// The cancellation token is passed so predicates that wait internally (such
/// as [`super::Consistently`]) can stop early. Predicates that only perform a
/// single API read may ignore it.
#[async_trait]
pub trait Predicate: Send + Sync {
    /// Human readable description used in logs and terminal errors.
    fn describe(&self) -> String;

    /// Evaluate the condition once.
    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckFailure>;
}

#[async_trait]
impl<P: Predicate + ?Sized> Predicate for &P {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckFailure> {
        (**self).check(cancel).await
    }
}

#[async_trait]
impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckFailure> {
        (**self).check(cancel).await
    }
}

#[async_trait]
impl<P: Predicate + ?Sized> Predicate for Arc<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckFailure> {
        (**self).check(cancel).await
    }
}

/// Adapts an async closure into a [`Predicate`].
///
/// # Example
///
/// ```rust,no_run
/// use cluster_e2e::errors::CheckFailure;
/// use cluster_e2e::wait::predicate_fn;
///
/// let always_ready = predicate_fn("always ready", || async { Ok::<(), CheckFailure>(()) });
/// ```
pub struct FnPredicate<F> {
    description: String,
    f: F,
}

/// Create a [`FnPredicate`] from a description and an async closure.
pub fn predicate_fn<F, Fut>(description: impl Into<String>, f: F) -> FnPredicate<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CheckFailure>> + Send + 'static,
{
    FnPredicate {
        description: description.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> Predicate for FnPredicate<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CheckFailure>> + Send + 'static,
{
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        (self.f)().await
    }
}
