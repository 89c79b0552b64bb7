use crate::config::{LOG_ENV, LogConfig};
use crate::error::ConfigError;
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `EXHAUSTIVE_LOG` takes precedence over `config.filter` when it is set and parses.
/// Fails if a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ConfigError::Invalid(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("Could not install logger: {}", e)))
}
