// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Inclusive count ranges for elastic quantities.
//!
//! Autoscaled node pools do not have a single target size, so node checks
//! accept any observed count inside `[min, max]`.

use crate::errors::WaitError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive `[min, max]` bound on an observed count. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCountRange")]
pub struct CountRange {
    min: u32,
    max: u32,
}

#[derive(Deserialize)]
struct RawCountRange {
    min: u32,
    max: u32,
}

impl TryFrom<RawCountRange> for CountRange {
    type Error = WaitError;

    fn try_from(raw: RawCountRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl CountRange {
    /// Create a range, rejecting `min > max`.
    ///
    /// # Errors
    ///
    /// Returns `WaitError::InvalidConfig` when `min` exceeds `max`.
    pub fn new(min: u32, max: u32) -> Result<Self, WaitError> {
        if min > max {
            return Err(WaitError::InvalidConfig(format!(
                "range minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// A range that accepts exactly `count`.
    #[must_use]
    pub fn exact(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns `true` when the range admits a single value.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }

    /// Returns `true` iff `min <= observed <= max`.
    #[must_use]
    pub fn contains(&self, observed: u32) -> bool {
        self.min <= observed && observed <= self.max
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}
