use super::LoopState;
use super::hash::calculate_input_hash;
use crate::error::StateError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Owns one state file and the [`LoopState`] loaded from it.
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
    default_state: LoopState,
    state: LoopState,
}

impl StateManager {
    /// Loads the state at `path`. A missing or unreadable file yields the default state.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_default(path, LoopState::default())
    }

    pub fn with_default(path: impl Into<PathBuf>, default_state: LoopState) -> Self {
        let path = path.into();
        let state = match load(&path) {
            Ok(Some(state)) => {
                debug!(
                    path = %path.display(),
                    index = state.global_index,
                    completed = state.is_completed,
                    "state loaded"
                );
                state
            }
            Ok(None) => {
                debug!(path = %path.display(), "no state file, starting from the default state");
                default_state.clone()
            }
            Err(e) => {
                error!(error = %e, "could not load state, using the default state");
                default_state.clone()
            }
        };
        Self {
            path,
            default_state,
            state,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LoopState {
        &mut self.state
    }

    pub fn update(&mut self, f: impl FnOnce(&mut LoopState)) {
        f(&mut self.state);
        debug!(state = ?self.state, "state updated");
    }

    /// Replaces the state with `new_state` (or the default), optionally clearing the hash.
    pub fn reset(&mut self, new_state: Option<LoopState>, reset_hash: bool) {
        self.state = new_state.unwrap_or_else(|| self.default_state.clone());
        if reset_hash {
            self.state.last_input_hash.clear();
        }
        debug!(state = ?self.state, "state reset");
    }

    /// Writes the state as pretty-printed JSON, creating parent directories as needed.
    pub fn save(&self) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.state).map_err(|source| StateError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)?;

        info!(
            index = self.state.global_index,
            hash = %short_hash(&self.state.last_input_hash),
            "state saved"
        );
        Ok(())
    }

    /// Saves, logging instead of returning a failure. A failed save never stops a run.
    pub fn save_or_log(&self) {
        if let Err(e) = self.save() {
            error!(error = %e, "could not save state");
        }
    }

    pub fn calculate_input_hash(
        &self,
        inputs: &BTreeMap<String, String>,
        include_keys: Option<&[&str]>,
    ) -> String {
        calculate_input_hash(inputs, include_keys)
    }

    /// True when `inputs` hash differently from the last recorded hash.
    pub fn check_input_change(
        &self,
        inputs: &BTreeMap<String, String>,
        include_keys: Option<&[&str]>,
    ) -> bool {
        calculate_input_hash(inputs, include_keys) != self.state.last_input_hash
    }
}

/// Reads a state file. `Ok(None)` when it does not exist.
pub fn load(path: &Path) -> Result<Option<LoopState>, StateError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| StateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StateError::Json {
            path: path.display().to_string(),
            source,
        })
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
