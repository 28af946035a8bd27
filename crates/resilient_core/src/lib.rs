//! # Resilient core
//!
//! Two small affective models:
//!
//! - [`AffectiveTracker`]: keyword-driven stress with a hard cap, plus a
//!   capped message memory that forgets the oldest non-positive entry first.
//! - [`Agent`]: a resilience loop over energy, motivation, learning pace and
//!   two kinds of stress, with zombie detection and forced recovery pauses.

pub mod agent;
pub mod config;
pub mod sentiment;
pub mod state;
pub mod tracker;

pub use agent::{Agent, EmotionalRecord, MemoryLog, RecoveryTrigger};
pub use config::{ChatConfig, LoggingConfig, ResilientConfig, SimulationConfig};
pub use sentiment::{classify, Classification};
pub use state::AgentState;
pub use tracker::{AffectiveTracker, TrackerStatus, MEMORY_LIMIT, STRESS_HARD_CAP};
