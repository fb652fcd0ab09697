//! Scorer configuration
//!
//! Loaded from JSON or YAML. Every field has a default, so an empty document
//! is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use thiserror::Error;

/// Names a config file to load when the host passes none explicitly
pub const CONFIG_PATH_ENV: &str = "CRICKET_SCORER_CONFIG";

/// Longest match format the scorer accepts
pub const MAX_OVERS_LIMIT: u32 = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Overs per innings when the match setup does not say (default: 20)
    #[serde(default = "default_max_overs")]
    pub max_overs: u32,

    /// Bowler label used when no name is supplied (default: "Unknown")
    #[serde(default = "default_unknown_bowler")]
    pub unknown_bowler: String,

    /// Undo history length per innings; 0 disables undo (default: 64)
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,

    /// JSON-lines delivery log. None keeps no audit trail.
    #[serde(default)]
    pub audit_log_path: Option<PathBuf>,
}

fn default_max_overs() -> u32 {
    20
}
fn default_unknown_bowler() -> String {
    "Unknown".to_string()
}
fn default_undo_depth() -> usize {
    64
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            max_overs: default_max_overs(),
            unknown_bowler: default_unknown_bowler(),
            undo_depth: default_undo_depth(),
            audit_log_path: None,
        }
    }
}

impl ScorerConfig {
    /// Loads a config file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScorerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ScorerConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_overs == 0 || self.max_overs > MAX_OVERS_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "max_overs must be 1-{}, got {}",
                MAX_OVERS_LIMIT, self.max_overs
            )));
        }
        if self.unknown_bowler.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "unknown_bowler must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads the file named by [`CONFIG_PATH_ENV`], if set.
pub fn config_from_env() -> Result<Option<ScorerConfig>, ConfigError> {
    config_from_path_var(env::var(CONFIG_PATH_ENV).ok())
}

fn config_from_path_var(value: Option<String>) -> Result<Option<ScorerConfig>, ConfigError> {
    let Some(path) = value else {
        return Ok(None);
    };
    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }
    ScorerConfig::load(path)
        .map(Some)
        .map_err(|e| match e {
            ConfigError::IoError(msg) => {
                ConfigError::IoError(format!("{CONFIG_PATH_ENV}='{path}': {msg}"))
            }
            other => other,
        })
}
