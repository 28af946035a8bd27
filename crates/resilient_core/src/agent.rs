//! Resilient agent: a multi-variable stress/recovery loop.
//!
//! Each [`Agent::step`] runs four phases in order:
//! 1. **perceive** - record the input and accumulate environmental/self stress
//! 2. **reflect** - decay provisional memories, let light ones go, pay for shame
//! 3. **zombie check** - detect a stalled learning pace and kick it back up
//! 4. **recover** - pick a recovery trigger and apply it, with forced pauses
//!
//! Every phase ends with [`AgentState::normalize`], so no scalar ever leaves
//! `[0.0, 1.0]` or turns NaN.

use crate::state::AgentState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Default capacity of the emotional memory log.
pub const MEMORY_LOG_CAPACITY: usize = 100;

/// How many recent records feed the outcome average.
const RECENT_WINDOW: usize = 10;

/// Below this relevance a provisional record is forgotten.
const FORGET_RELEVANCE: f64 = 0.05;

/// Hourly relevance decay factor.
const RELEVANCE_DECAY_PER_HOUR: f64 = 0.95;

/// A single perceived emotional event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalRecord {
    pub id: Uuid,
    pub label: String,
    /// Always >= 0
    pub intensity: f64,
    pub context: String,
    /// Provisional records are still being reflected on
    pub provisional: bool,
    pub timestamp: DateTime<Utc>,
    /// Decays with age; removed below 0.05
    pub relevance: f64,
}

impl EmotionalRecord {
    pub fn new(label: impl Into<String>, intensity: f64, context: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            intensity,
            context: context.into(),
            provisional: true,
            timestamp: Utc::now(),
            relevance: 1.0,
        }
    }

    /// Override the timestamp (backdated or future-dated records).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Bounded log of emotional records; the oldest record drops out when full.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    records: VecDeque<EmotionalRecord>,
    capacity: usize,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::with_capacity(MEMORY_LOG_CAPACITY)
    }
}

impl MemoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, forcing its intensity non-negative.
    pub fn add(&mut self, mut record: EmotionalRecord) {
        record.intensity = record.intensity.max(0.0);
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &EmotionalRecord> {
        self.records.iter().skip(self.records.len().saturating_sub(n))
    }

    pub fn records(&self) -> impl Iterator<Item = &EmotionalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean intensity of the most recent records, 0.0 when empty.
    pub fn recent_outcome(&self) -> f64 {
        let (sum, count) = self
            .recent(RECENT_WINDOW)
            .fold((0.0, 0usize), |(s, c), r| (s + r.intensity, c + 1));
        sum / count.max(1) as f64
    }
}

/// Which recovery path the agent takes this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTrigger {
    Emergency,
    Normal,
    Optimal,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct Agent {
    pub state: AgentState,
    pub memory: MemoryLog,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input and accumulate stress from it.
    pub fn perceive(&mut self, input_quality: f64, emotional_intensity: f64, label: &str) {
        self.perceive_at(Utc::now(), input_quality, emotional_intensity, label);
    }

    pub fn perceive_at(
        &mut self,
        now: DateTime<Utc>,
        input_quality: f64,
        emotional_intensity: f64,
        label: &str,
    ) {
        let emotional_intensity = emotional_intensity.max(0.0);
        self.memory
            .add(EmotionalRecord::new(label, emotional_intensity, "input_perception").at(now));

        // Environment vs self-responsibility are tracked separately
        let state = &mut self.state;
        state.env_stress = (state.env_stress + (1.0 - input_quality) * 0.5).min(1.0);
        state.self_stress = (state.self_stress + emotional_intensity * 0.5).min(1.0);

        if state.env_stress > 0.5 {
            state.adversarial_env = true;
        }
        state.normalize();
    }

    pub fn reflect_black_history(&mut self) {
        self.reflect_black_history_at(Utc::now());
    }

    /// Reflect on provisional memories as of `now`.
    ///
    /// Light, still-relevant records are let go (and lift motivation); the
    /// rest accumulate shame. Recovery is paid for in proportion to shame.
    pub fn reflect_black_history_at(&mut self, now: DateTime<Utc>) {
        let state = &mut self.state;
        let mut shame_intensity = 0.0;
        let mut forgotten = Vec::new();

        for r in self.memory.records.iter_mut().filter(|r| r.provisional) {
            // Future timestamps count as zero age
            let age_hours = ((now - r.timestamp).num_milliseconds() as f64 / 3_600_000.0).max(0.0);
            r.relevance *= RELEVANCE_DECAY_PER_HOUR.powf(age_hours);

            if r.intensity < 0.5 && r.relevance > 0.1 {
                r.provisional = false;
                state.motivation = (state.motivation + 0.02).min(1.0);
            } else {
                shame_intensity += r.intensity * r.relevance;
            }

            if r.relevance < FORGET_RELEVANCE {
                forgotten.push(r.id);
            }
        }

        if !forgotten.is_empty() {
            self.memory.records.retain(|r| !forgotten.contains(&r.id));
            tracing::debug!("Forgot {} faded records", forgotten.len());
        }

        // Recovery always has a cost
        let recovery_amount = (shame_intensity * 0.03).min(0.15);
        state.energy += if state.self_stress < 0.5 {
            recovery_amount
        } else {
            0.05
        };
        state.self_stress -= recovery_amount * 0.8;

        if state.env_stress > 0.5 {
            state.resilience = (state.resilience - 0.05).max(0.0);
        }
        state.normalize();
    }

    /// Decide which recovery path applies.
    ///
    /// Checks run in a fixed order: emergency, normal, optimal. Any state that
    /// satisfies the optimal conditions also satisfies normal, so optimal is
    /// only reported if the normal rule is ever tightened.
    pub fn detect_recovery_trigger(&self) -> RecoveryTrigger {
        let s = &self.state;
        let total_stress = s.total_stress();
        if total_stress > 0.8 || s.energy < 0.2 {
            return RecoveryTrigger::Emergency;
        }

        let met = [total_stress < 0.5, s.energy > 0.5, s.motivation > 0.3]
            .iter()
            .filter(|c| **c)
            .count();
        if met >= 2 {
            return RecoveryTrigger::Normal;
        }
        if total_stress < 0.3 && s.energy > 0.6 && s.motivation > 0.4 {
            return RecoveryTrigger::Optimal;
        }
        RecoveryTrigger::None
    }

    pub fn recover_and_reboot(&mut self) -> RecoveryTrigger {
        let trigger = self.detect_recovery_trigger();
        let recent_outcome = self.memory.recent_outcome();
        let s = &mut self.state;

        match trigger {
            RecoveryTrigger::Emergency => {
                s.env_stress *= 0.5;
                s.self_stress *= 0.5;
                s.energy += 0.2;
                s.learning_pace *= 0.8;
                s.recover_count += 1;
            }
            RecoveryTrigger::Normal => {
                s.learning_pace += 0.05;
                s.resilience += 0.03;
                s.recover_count += 1;
            }
            RecoveryTrigger::Optimal => {
                s.learning_pace += 0.05;
                s.resilience += 0.05;
                s.recover_count += 1;
            }
            RecoveryTrigger::None => {}
        }

        // Monitoring fatigue: recovering without good outcomes costs something
        if trigger != RecoveryTrigger::None && recent_outcome < 0.3 {
            s.self_stress += 0.05;
        }

        if s.recover_count > 10 {
            self.force_pause();
        }
        self.state.normalize();
        trigger
    }

    /// Break a recovery habit: reset the counter at some energy cost.
    fn force_pause(&mut self) {
        tracing::debug!("Recovery count exceeded, forcing a pause");
        self.state.recover_count = 0;
        self.state.energy *= 0.8;
        self.state.motivation += 0.1;
    }

    /// Detect a stalled learning pace ("zombie" mode) and push it back up.
    pub fn zombie_feedback_machine(&mut self) {
        let recent_outcome = self.memory.recent_outcome();
        let s = &mut self.state;
        let expected_pace = 0.3 + s.resilience * 0.4;

        if s.learning_pace < expected_pace * 0.7 && recent_outcome < 0.3 {
            s.zombie_flag = true;
            s.zombie_flag_count += 1;
            s.learning_pace += 0.05 + (expected_pace - s.learning_pace) * 0.2;
            s.motivation -= 0.05 * s.zombie_flag_count as f64;
            s.resilience *= 0.95;
            tracing::debug!(
                "Zombie state detected (count={}, pace={:.3}, expected={:.3})",
                s.zombie_flag_count,
                s.learning_pace,
                expected_pace
            );
            if s.zombie_flag_count > 3 {
                self.force_reboot();
            }
        } else {
            s.zombie_flag = false;
            s.zombie_flag_count = 0;
        }
    }

    fn force_reboot(&mut self) {
        self.state.learning_pace = 0.5;
        self.state.resilience = (self.state.resilience * 0.9).max(0.5);
    }

    pub fn should_continue(&self) -> bool {
        self.state.recover_count < 15 && self.state.total_stress() < 0.9
    }

    /// Run one full perceive → reflect → zombie → recover cycle.
    ///
    /// Returns whether the agent should keep going.
    pub fn step(&mut self, input_quality: f64, emotional_intensity: f64, label: &str) -> bool {
        self.step_at(Utc::now(), input_quality, emotional_intensity, label)
    }

    /// [`Agent::step`] against an explicit clock.
    pub fn step_at(
        &mut self,
        now: DateTime<Utc>,
        input_quality: f64,
        emotional_intensity: f64,
        label: &str,
    ) -> bool {
        let input_quality = input_quality.clamp(0.0, 1.0);
        let emotional_intensity = emotional_intensity.max(0.0);

        self.perceive_at(now, input_quality, emotional_intensity, label);
        self.reflect_black_history_at(now);
        self.zombie_feedback_machine();
        self.recover_and_reboot();

        // Natural decay keeps resilience from locking in
        if self.state.resilience > 0.5 {
            self.state.resilience -= 0.01;
        }
        self.state.normalize();

        let keep_going = self.should_continue();
        if !keep_going {
            tracing::info!(
                "Agent paused for recovery (total_stress={:.3}, recover_count={})",
                self.state.total_stress(),
                self.state.recover_count
            );
        }
        keep_going
    }
}
