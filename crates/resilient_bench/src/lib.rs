//! resilient_bench: long-run trajectory simulation.
//!
//! Drives the resilient agent and the affective tracker with random input for
//! many steps and records how their state evolves:
//! - agent trajectories sampled at a fixed interval
//! - tracker invariants checked after every message

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use resilient_core::{sentiment, AffectiveTracker, Agent, MEMORY_LIMIT, STRESS_HARD_CAP};
use serde::{Deserialize, Serialize};

/// Labels drawn at random for simulated inputs.
pub const LABELS: &[&str] = &["Relief", "Shame", "Confusion", "Interest"];

/// Message pool for tracker simulation: positive, negative, mixed and neutral.
pub const PHRASES: &[&str] = &[
    "thank you so much",
    "that was a nice surprise",
    "I appreciate it",
    "I am so angry",
    "tired of this",
    "what a bad day",
    "thanks, but I hate waiting",
    "see you later",
    "the meeting moved to 3pm",
    "ok",
];

/// One sampled point of an agent trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub step: u64,
    pub energy: f64,
    pub total_stress: f64,
    pub learning_pace: f64,
    pub resilience: f64,
    pub motivation: f64,
}

impl TrajectorySample {
    fn capture(step: u64, agent: &Agent) -> Self {
        let s = &agent.state;
        Self {
            step,
            energy: s.energy,
            total_stress: s.total_stress(),
            learning_pace: s.learning_pace,
            resilience: s.resilience,
            motivation: s.motivation,
        }
    }
}

/// Step `agent` `steps` times with random input, sampling every `sample_every` steps.
///
/// Inputs mimic real-world variability: quality in `[0.1, 0.9)`, intensity in
/// `[0.0, 1.0)` and a random label. A `sample_every` of 0 records nothing.
pub fn simulate_agent<R: Rng + ?Sized>(
    agent: &mut Agent,
    steps: u64,
    sample_every: u64,
    rng: &mut R,
) -> Vec<TrajectorySample> {
    let mut history = Vec::new();
    let mut pauses = 0u64;
    // Steps run back to back, so every record is reflected on at age zero.
    let now = Utc::now();

    for step in 1..=steps {
        let quality = rng.gen_range(0.1..0.9);
        let intensity = rng.gen_range(0.0..1.0);
        let label = LABELS.choose(rng).copied().unwrap_or("Interest");

        if !agent.step_at(now, quality, intensity, label) {
            pauses += 1;
        }

        if sample_every > 0 && step % sample_every == 0 {
            history.push(TrajectorySample::capture(step, agent));
        }
    }

    tracing::debug!(
        "Simulated {} steps ({} samples, {} pause signals)",
        steps,
        history.len(),
        pauses
    );
    history
}

/// Summary of a tracker simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerRun {
    pub messages: u64,
    /// Calls where memory was over the limit and one entry was forgotten
    pub evictions: u64,
    /// Calls where memory was over the limit but every entry was protected
    pub blocked_evictions: u64,
    pub peak_stress: f64,
    pub final_memory_count: usize,
    /// Calls after which a tracker invariant did not hold
    pub violations: u64,
}

/// Feed `messages` random phrases to `tracker`, checking invariants after each.
///
/// A violation is counted when stress leaves `[0, STRESS_HARD_CAP]`, or when
/// memory is over the limit while still holding an unprotected entry.
pub fn simulate_tracker<R: Rng + ?Sized>(
    tracker: &mut AffectiveTracker,
    messages: u64,
    rng: &mut R,
) -> TrackerRun {
    let mut run = TrackerRun {
        messages,
        ..Default::default()
    };

    for _ in 0..messages {
        let phrase = PHRASES.choose(rng).copied().unwrap_or("ok");
        let before = tracker.memories().len();
        tracker.process_text(phrase);
        let after = tracker.memories().len();

        if before + 1 > MEMORY_LIMIT {
            if after == before {
                run.evictions += 1;
            } else {
                run.blocked_evictions += 1;
            }
        }

        let stress = tracker.stress_level();
        if !(0.0..=STRESS_HARD_CAP).contains(&stress) {
            tracing::warn!("Stress escaped its bounds: {}", stress);
            run.violations += 1;
        }
        if after > MEMORY_LIMIT
            && !tracker
                .memories()
                .iter()
                .all(|m| sentiment::is_positive(m))
        {
            tracing::warn!("Memory grew to {} with unprotected entries", after);
            run.violations += 1;
        }
        run.peak_stress = run.peak_stress.max(stress);
    }

    run.final_memory_count = tracker.memories().len();
    run
}
