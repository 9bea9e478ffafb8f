//! Simulation configuration
//!
//! Loaded from JSON on native hosts; the browser passes the same JSON in.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{LEVEL_ROWS, MAX_LEVEL_WIDTH};
use crate::error::ConfigError;
use crate::sim::PowerState;

/// Per-run simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Level text ===
    /// Exact number of rows a level must have
    pub rows: usize,
    /// Widest accepted level, in tiles
    pub max_width: usize,

    // === Time ===
    /// Time limit in milliseconds (0 disables the limit)
    pub time_limit_ms: u32,
    /// Simulated milliseconds per tick
    pub ms_per_tick: u32,

    // === Player ===
    pub initial_power: PowerState,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: LEVEL_ROWS,
            max_width: MAX_LEVEL_WIDTH,

            time_limit_ms: 20_000,
            ms_per_tick: 30,

            initial_power: PowerState::Small,
        }
    }
}

impl SimConfig {
    /// Tick ceiling derived from the time limit, `None` when unlimited
    pub fn max_ticks(&self) -> Option<u32> {
        if self.time_limit_ms == 0 || self.ms_per_tick == 0 {
            return None;
        }
        Some(self.time_limit_ms.div_ceil(self.ms_per_tick))
    }

    /// Same config with a different time limit
    pub fn with_time_limit(mut self, time_limit_ms: u32) -> Self {
        self.time_limit_ms = time_limit_ms;
        self
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ms_per_tick == 0 {
            return Err(ConfigError::ZeroTickLength);
        }
        Ok(())
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load a config file if given, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default simulation config");
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded simulation config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default simulation config");
                Self::default()
            }
        }
    }
}
