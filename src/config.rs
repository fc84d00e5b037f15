//! Configuration management
//!
//! Engine and logging settings, loaded from a TOML file or defaulted.

use crate::error::{Error, Result};
use crate::models::ForestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default artifact name
pub const DEFAULT_MODEL_NAME: &str = "dropout_model";

/// Risk engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding persisted model artifacts
    pub model_dir: PathBuf,
    /// Artifact name, one file per name
    pub model_name: String,
    /// Held-out evaluation share
    pub test_ratio: f64,
    /// Seed for the train/evaluation shuffle
    pub split_seed: u64,
    /// Classifier settings
    pub forest: ForestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            test_ratio: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Use a different artifact directory
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Use a different artifact name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_ratio) {
            return Err(Error::Config(format!(
                "test_ratio must be in [0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(Error::Config("model_name must not be empty".to_string()));
        }
        if self.forest.n_trees == 0 {
            return Err(Error::Config("forest.n_trees must be positive".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive for the library target
    pub fn directive(&self) -> String {
        format!("dropout_risk={}", self.level)
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}
