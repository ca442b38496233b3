//! Arbiter configuration.
//!
//! Loaded from YAML, then optionally overridden from the environment:
//!   CONTEXT_ARBITER_MAX_QUEUE_SIZE: standby capacity per path (default: 10)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::standby::MAX_QUEUE_SIZE;

pub const ENV_MAX_QUEUE_SIZE: &str = "CONTEXT_ARBITER_MAX_QUEUE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArbiterConfig {
    /// Standby registrations allowed per context path, not counting the
    /// active owner.
    pub max_queue_size: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            max_queue_size: MAX_QUEUE_SIZE,
        }
    }
}

impl ArbiterConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_MAX_QUEUE_SIZE) {
            self.max_queue_size = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_MAX_QUEUE_SIZE.to_string(),
                reason: format!("expected a positive integer, got {:?}", raw),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid {
                key: "max_queue_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
