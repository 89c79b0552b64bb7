//! Runtime configuration for the extensions and the backend nodes.
//!
//! Every section has defaults matching the stock plugin, so an empty JSON object is a
//! valid configuration:
//!
//! ```rust
//! use exhaustive::config::Config;
//!
//! let config = Config::from_json("{}").unwrap();
//! assert_eq!(config.reconciler.max_pools, 15);
//! assert_eq!(config.scheduler.settle_delay_ms, 20);
//! ```
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides [`LogConfig::filter`].
pub const LOG_ENV: &str = "EXHAUSTIVE_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub reconciler: ReconcilerConfig,
    pub scheduler: SchedulerConfig,
    pub state: StateConfig,
    pub logging: LogConfig,
}

/// Which node type gets dynamic pool slots, and what those slots look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub node_type: String,
    pub slot_prefix: String,
    pub slot_type: String,
    pub max_pools: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            node_type: "PromptCombinationGenerator".to_string(),
            slot_prefix: "pool_".to_string(),
            slot_type: "STRING".to_string(),
            max_pools: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay between a lifecycle event and the reconciliation it triggers.
    pub settle_delay_ms: u64,
}

impl SchedulerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 20,
        }
    }
}

/// Where the backend nodes keep their loop state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub dir: PathBuf,
    pub combinator_file: String,
    pub loop_file: String,
}

impl StateConfig {
    pub fn combinator_path(&self) -> PathBuf {
        self.dir.join(&self.combinator_file)
    }

    pub fn loop_path(&self) -> PathBuf {
        self.dir.join(&self.loop_file)
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("custom_nodes"),
            combinator_file: "exhaustive_state.json".to_string(),
            loop_file: "auto_queue_state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `"info"` or `"exhaustive=debug"`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconciler.max_pools == 0 {
            return Err(ConfigError::Invalid(
                "reconciler.max_pools must be at least 1".to_string(),
            ));
        }
        if self.reconciler.slot_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "reconciler.slot_prefix must not be empty".to_string(),
            ));
        }
        if self.reconciler.node_type.is_empty() {
            return Err(ConfigError::Invalid(
                "reconciler.node_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
