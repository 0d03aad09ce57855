//! Reduction configuration.
use std::path::Path;

use cit_explore::coverage::DEFAULT_STRENGTH;
use cit_explore::discover::DiscoveryConfig;
use cit_model::{DEFAULT_ABSENT, DEFAULT_SEPARATOR};
use serde::{Deserialize, Serialize};

/// Errors while loading or checking a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of a reduction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// Interaction strength `t` (default: 3).
    pub strength: usize,
    /// Separator between name components (default: `.`).
    pub separator: char,
    /// Placeholder for missing trailing categories (default: empty string).
    pub absent: String,
    /// Seed for the covering-array tie-breaking order.
    pub seed: u64,
    /// Cap on combinations tested during constraint discovery. None = unlimited.
    pub max_explored: Option<u64>,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            separator: DEFAULT_SEPARATOR,
            absent: DEFAULT_ABSENT.to_string(),
            seed: 0,
            max_explored: None,
        }
    }
}

impl ReductionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strength == 0 {
            return Err(ConfigError::Invalid(
                "strength must be at least 1".to_string(),
            ));
        }
        if self.absent.contains(self.separator) {
            return Err(ConfigError::Invalid(format!(
                "absent value {:?} contains the separator {:?}",
                self.absent, self.separator
            )));
        }
        Ok(())
    }

    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_explored: self.max_explored,
        }
    }
}
