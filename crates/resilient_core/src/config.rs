use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

/// Runtime settings for the `resilient` binary.
///
/// The tracker's own limits (stress cap, memory limit, keyword sets) are
/// constants and are not configurable here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResilientConfig {
    pub logging: LoggingConfig,
    pub chat: ChatConfig,
    pub simulation: SimulationConfig,
}

impl ResilientConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse config from TOML text without applying env overrides.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML config")
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let (cfg, err) = Self::load_or_default_reporting(path);
        if let Some(e) = err {
            tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
        }
        cfg
    }

    /// Like [`ResilientConfig::load_or_default`], but hands the load error back
    /// instead of logging it. Used before a log subscriber is installed.
    pub fn load_or_default_reporting<P: AsRef<Path>>(
        path: P,
    ) -> (Self, Option<anyhow::Error>) {
        match Self::load(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => {
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                (cfg, Some(e))
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RESILIENT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("RESILIENT_LOG_JSON") {
            if let Ok(b) = v.parse() {
                self.logging.json = b;
            }
        }
        if let Some(v) = lookup("RESILIENT_SIM_STEPS") {
            if let Ok(n) = v.parse() {
                self.simulation.steps = n;
            }
        }
        if let Some(v) = lookup("RESILIENT_SIM_SAMPLE_EVERY") {
            if let Ok(n) = v.parse() {
                self.simulation.sample_every = n;
            }
        }
        if let Some(v) = lookup("RESILIENT_SIM_SEED") {
            if let Ok(n) = v.parse() {
                self.simulation.seed = Some(n);
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "resilient_core=debug")
    pub level: String,
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Print the tracker status after every processed line
    pub show_status: bool,
    pub prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_status: true,
            prompt: "> ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub steps: u64,
    pub sample_every: u64,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 100_000,
            sample_every: 1_000,
            seed: None,
        }
    }
}
