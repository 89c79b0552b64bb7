use super::ChangeToken;
use super::auto_queue::AutoQueue;
use crate::signal::{Signal, SignalSink};
use crate::state::{self, StateManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const LOOP_CONTROLLER_NAME: &str = "AutoQueueLoopController";

/// How the controller picks the index to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexMode {
    /// Resume the saved index; restart when the config changed or the walk completed.
    #[default]
    Auto,
    /// Run the caller's `start_index`.
    Specified,
    /// Always restart at 0.
    #[serde(rename = "From Start")]
    FromStart,
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexMode::Auto => "Auto",
            IndexMode::Specified => "Specified",
            IndexMode::FromStart => "From Start",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for IndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Auto" | "auto" => Ok(IndexMode::Auto),
            "Specified" | "specified" => Ok(IndexMode::Specified),
            "From Start" | "from-start" | "from_start" => Ok(IndexMode::FromStart),
            other => Err(format!("unknown index mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopInputs {
    pub combo_list: Vec<String>,
    pub total_count: u64,
    pub config_hash: String,
    #[serde(default)]
    pub index_mode: IndexMode,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default = "default_iteration_limit")]
    pub max_iteration_limit: u64,
}

fn default_iteration_limit() -> u64 {
    100
}

impl LoopInputs {
    pub fn effective_limit(&self) -> u64 {
        self.max_iteration_limit.min(self.total_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutput {
    pub prompt: String,
    pub status_log: String,
}

/// Walks a precomputed combination list, one item per execution.
pub struct AutoQueueLoopController {
    node_id: String,
    state: StateManager,
    queue: AutoQueue,
}

impl AutoQueueLoopController {
    pub fn new(
        node_id: impl Into<String>,
        state_path: impl Into<PathBuf>,
        sink: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            state: StateManager::open(state_path),
            queue: AutoQueue::new(LOOP_CONTROLLER_NAME, sink),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn execute(&mut self, inputs: &LoopInputs) -> LoopOutput {
        let global_index = self.determine_index(inputs);
        let effective_limit = inputs.effective_limit();
        debug!(
            limit = inputs.max_iteration_limit,
            total = inputs.total_count,
            effective_limit,
            "loop limit"
        );

        let Some(prompt) = usize::try_from(global_index)
            .ok()
            .and_then(|i| inputs.combo_list.get(i))
            .cloned()
        else {
            let status_log = format!(
                "index out of range: global_index={}, list length={}",
                global_index,
                inputs.combo_list.len()
            );
            error!(global_index, len = inputs.combo_list.len(), "index out of range");
            return LoopOutput {
                prompt: String::new(),
                status_log,
            };
        };

        let status_log = status_log(global_index, inputs, effective_limit);
        info!(
            index = global_index,
            total = inputs.total_count,
            effective_limit,
            mode = %inputs.index_mode,
            "loop step"
        );

        let should_continue = self.step(global_index, inputs, effective_limit);
        self.queue
            .report_progress(&self.node_id, global_index + 1, inputs.total_count);
        if should_continue {
            self.queue.send_signal(&Signal::add_queue(Some(&self.node_id)));
        } else {
            debug!("loop stopped, no further items queued");
        }

        LoopOutput { prompt, status_log }
    }

    fn determine_index(&mut self, inputs: &LoopInputs) -> u64 {
        let config_hash = inputs.config_hash.clone();
        match inputs.index_mode {
            IndexMode::FromStart => {
                debug!("'From Start' mode, restarting at 0");
                self.restart(0, config_hash);
                0
            }
            IndexMode::Specified => {
                debug!(start_index = inputs.start_index, "'Specified' mode");
                self.restart(inputs.start_index, config_hash);
                inputs.start_index
            }
            IndexMode::Auto => {
                let state = self.state.state();
                if state.last_input_hash != config_hash {
                    info!(
                        old = %short(&state.last_input_hash),
                        new = %short(&config_hash),
                        "config hash changed, restarting at 0"
                    );
                    self.restart(0, config_hash);
                    0
                } else if state.is_completed {
                    info!("previous walk completed, restarting at 0");
                    self.state.update(|s| s.advance_to(0));
                    self.state.save_or_log();
                    0
                } else {
                    let index = state.global_index;
                    debug!(index, "resuming");
                    index
                }
            }
        }
    }

    fn restart(&mut self, index: u64, config_hash: String) {
        self.state.update(|s| {
            s.advance_to(index);
            s.last_input_hash = config_hash;
        });
        self.state.save_or_log();
    }

    /// Saves the index following `global_index`; returns whether to queue another run.
    fn step(&mut self, global_index: u64, inputs: &LoopInputs, effective_limit: u64) -> bool {
        let next_index = global_index + 1;
        let config_hash = inputs.config_hash.clone();

        let should_continue = if global_index >= inputs.total_count.saturating_sub(1) {
            info!(total = inputs.total_count, "all items processed");
            self.state.update(|s| {
                s.complete();
                s.last_input_hash = config_hash;
            });
            false
        } else if global_index >= effective_limit.saturating_sub(1) {
            warn!(
                effective_limit,
                remaining = inputs.total_count - effective_limit,
                "iteration limit reached"
            );
            self.state.update(|s| {
                s.advance_to(next_index);
                s.last_input_hash = config_hash;
            });
            false
        } else {
            debug!(next_index, "continuing");
            self.state.update(|s| {
                s.advance_to(next_index);
                s.last_input_hash = config_hash;
            });
            true
        };
        self.state.save_or_log();
        should_continue
    }

    /// Whether the host must run the controller again for `inputs`.
    pub fn is_changed(state_path: &Path, inputs: &LoopInputs) -> ChangeToken {
        match state::load(state_path) {
            Ok(None) => ChangeToken::Always,
            Ok(Some(saved)) => {
                if !saved.is_completed && saved.global_index < inputs.effective_limit() {
                    ChangeToken::Always
                } else {
                    ChangeToken::Hash(inputs.config_hash.clone())
                }
            }
            Err(e) => {
                warn!(error = %e, "change check failed, forcing execution");
                ChangeToken::Always
            }
        }
    }
}

fn status_log(global_index: u64, inputs: &LoopInputs, effective_limit: u64) -> String {
    format!(
        "=== Auto queue loop status ===\n\
         Current index: {}\n\
         Total count: {}\n\
         Effective limit: {}\n\
         Index mode: {}\n\
         Config hash: {}...\n\
         Progress: {}/{}",
        global_index,
        inputs.total_count,
        effective_limit,
        inputs.index_mode,
        short(&inputs.config_hash),
        global_index + 1,
        effective_limit
    )
}

fn short(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
