//! Configuration management for memviz
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! command line flags. The result is a [`SamplerConfig`] handed to the driver.

use crate::error::{MemvizError, Result};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bytes sampled per cycle unless configured otherwise
pub const DEFAULT_BUDGET: usize = 32 * 1024 * 1024;

/// Everything the sampling driver needs to run, apart from the process itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub budget: usize,
    pub gui: bool,
    pub min_cycle_interval: Option<Duration>,
    pub max_cycles: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            gui: false,
            min_cycle_interval: None,
            max_cycles: None,
        }
    }
}

impl SamplerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.budget == 0 {
            return Err(MemvizError::InvalidConfig(
                "sampling budget must be at least one byte".to_string(),
            ));
        }
        if self.max_cycles == Some(0) {
            return Err(MemvizError::InvalidConfig(
                "cycle limit must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings persisted in config.toml
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub budget: Option<usize>,
    pub gui: Option<bool>,
    pub min_cycle_interval_ms: Option<u64>,
}

impl Config {
    /// Get the path to the default config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memviz").join("config.toml"))
    }

    /// Load the default config file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load an explicit config file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| MemvizError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| MemvizError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply file settings on top of the defaults
    pub fn sampler_config(&self) -> SamplerConfig {
        let mut config = SamplerConfig::new();
        if let Some(budget) = self.budget {
            config.budget = budget;
        }
        if let Some(gui) = self.gui {
            config.gui = gui;
        }
        config.min_cycle_interval = self
            .min_cycle_interval_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
        config
    }
}
