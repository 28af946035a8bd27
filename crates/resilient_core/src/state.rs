//! Resilient agent state.
//!
//! Six bounded scalars plus the bookkeeping flags used by the zombie detector
//! and the recovery loop. Every scalar lives in `[0.0, 1.0]`; `normalize()`
//! restores that after each mutation and resets NaN/Inf to a neutral value.

use serde::{Deserialize, Serialize};

/// Neutral value used when a scalar turns NaN or infinite.
pub const NEUTRAL_FALLBACK: f64 = 0.5;

/// Guard against NaN and Infinity in state values.
#[inline]
pub(crate) fn sanitize_f64(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in agent state, resetting to {}", fallback);
        fallback
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Available energy
    pub energy: f64,
    /// Capacity to absorb setbacks; decays slowly when above 0.5
    pub resilience: f64,
    pub learning_pace: f64,
    pub motivation: f64,
    /// Stress attributed to the environment (poor input quality)
    pub env_stress: f64,
    /// Stress attributed to self (emotional intensity)
    pub self_stress: f64,

    pub zombie_flag: bool,
    pub zombie_flag_count: u32,
    pub recover_count: u32,
    /// Latched once environmental stress exceeds 0.5
    pub adversarial_env: bool,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            energy: 0.7,
            resilience: 0.5,
            learning_pace: 0.5,
            motivation: 0.6,
            env_stress: 0.0,
            self_stress: 0.0,
            zombie_flag: false,
            zombie_flag_count: 0,
            recover_count: 0,
            adversarial_env: false,
        }
    }
}

impl AgentState {
    /// Sanitize and clamp all scalars to `[0.0, 1.0]`.
    pub fn normalize(&mut self) {
        for v in [
            &mut self.energy,
            &mut self.resilience,
            &mut self.learning_pace,
            &mut self.motivation,
            &mut self.env_stress,
            &mut self.self_stress,
        ] {
            *v = sanitize_f64(*v, NEUTRAL_FALLBACK).clamp(0.0, 1.0);
        }
    }

    pub fn total_stress(&self) -> f64 {
        self.env_stress + self.self_stress
    }

    /// All six scalars, in declaration order.
    pub fn scalars(&self) -> [f64; 6] {
        [
            self.energy,
            self.resilience,
            self.learning_pace,
            self.motivation,
            self.env_stress,
            self.self_stress,
        ]
    }
}
