//! Affective tracker: keyword stress regulation plus a capped memory store.
//!
//! Every call to [`AffectiveTracker::process_text`] runs classify → regulate →
//! store, in that order, synchronously. The tracker is a plain owned value
//! with no interior locking; callers that share it across threads must guard
//! stress and memory together behind a single lock.

use crate::sentiment::{self, Classification};
use serde::{Deserialize, Serialize};

/// Upper bound for stress. Must never be exceeded.
pub const STRESS_HARD_CAP: f64 = 0.20;

/// Maximum number of retained memories (see the eviction edge case below).
pub const MEMORY_LIMIT: usize = 50;

/// Stress removed by a positive input.
pub const POSITIVE_RELIEF: f64 = 0.05;

/// Stress added by a negative input.
pub const NEGATIVE_STRAIN: f64 = 0.02;

/// Snapshot returned by [`AffectiveTracker::status`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerStatus {
    /// Stress rounded to three decimal places
    pub stress: f64,
    pub memory_count: usize,
}

/// Minimal affective-state tracker.
#[derive(Debug, Clone, Default)]
pub struct AffectiveTracker {
    stress_level: f64,
    memory: Vec<String>,
}

impl AffectiveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one input text and update internal state. Never fails.
    pub fn process_text(&mut self, text: &str) {
        let class = sentiment::classify(text);
        self.regulate(class);
        self.store_memory(text);

        if class.is_neutral() {
            tracing::trace!("Neutral input, stress unchanged at {:.3}", self.stress_level);
        }
        tracing::trace!(
            "Processed text: positive={}, negative={}, stress={:.3}, memories={}",
            class.positive,
            class.negative,
            self.stress_level,
            self.memory.len()
        );
    }

    /// Current status. Pure read.
    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            stress: round_to_millis(self.stress_level),
            memory_count: self.memory.len(),
        }
    }

    /// Unrounded stress level.
    pub fn stress_level(&self) -> f64 {
        self.stress_level
    }

    /// Retained memories, oldest first, stored verbatim.
    pub fn memories(&self) -> &[String] {
        &self.memory
    }

    fn regulate(&mut self, class: Classification) {
        // Recovery first: relief is applied before strain.
        if class.positive {
            self.stress_level = (self.stress_level - POSITIVE_RELIEF).max(0.0);
        }
        if class.negative {
            self.stress_level += NEGATIVE_STRAIN;
        }
        self.stress_level = self.stress_level.min(STRESS_HARD_CAP);
    }

    fn store_memory(&mut self, text: &str) {
        self.memory.push(text.to_string());
        if self.memory.len() > MEMORY_LIMIT {
            self.emotion_biased_forgetting();
        }
    }

    /// Remove the oldest memory that carries no positive-core keyword.
    ///
    /// Positive-core memories are never removed. When every entry is
    /// protected nothing is evicted and memory stays above the limit.
    fn emotion_biased_forgetting(&mut self) {
        match self.memory.iter().position(|m| !sentiment::is_positive(m)) {
            Some(index) => {
                let forgotten = self.memory.remove(index);
                tracing::debug!("Forgot memory at index {}: {:?}", index, forgotten);
            }
            None => {
                tracing::warn!(
                    "All {} memories are protected, nothing to forget (limit {})",
                    self.memory.len(),
                    MEMORY_LIMIT
                );
            }
        }
    }
}

/// Round to three decimal places, halves away from zero.
fn round_to_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
