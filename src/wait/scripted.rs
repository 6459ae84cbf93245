// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deterministic predicate that replays a scripted sequence of outcomes.
//!
//! Lets the poll loop and consistency wrapper be exercised without a cluster.
//! Once the script is exhausted the last outcome repeats.

use super::predicate::Predicate;
use crate::errors::CheckFailure;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub struct ScriptedPredicate {
    description: String,
    script: Vec<Result<(), CheckFailure>>,
    calls: AtomicUsize,
}

impl ScriptedPredicate {
    pub fn new(
        description: impl Into<String>,
        script: impl IntoIterator<Item = Result<(), CheckFailure>>,
    ) -> Self {
        Self {
            description: description.into(),
            script: script.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// `true` maps to success, `false` to a numbered `Unsatisfied` failure.
    pub fn from_bools(description: impl Into<String>, outcomes: &[bool]) -> Self {
        let script = outcomes.iter().enumerate().map(|(i, ok)| {
            if *ok {
                Ok(())
            } else {
                Err(CheckFailure::Unsatisfied(format!("scripted failure #{}", i + 1)))
            }
        });
        Self::new(description, script)
    }

    /// Number of times `check` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Predicate for ScriptedPredicate {
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), CheckFailure> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Err(CheckFailure::unsatisfied("empty script")))
    }
}
