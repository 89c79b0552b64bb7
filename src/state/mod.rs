//! Loop state persisted between executions of the backend nodes.
//!
//! Each stateful node owns one JSON file holding a [`LoopState`]. The file is read once
//! when the node is opened and rewritten after every step, so a restarted host resumes
//! where the previous run stopped.
pub mod hash;
pub mod manager;

pub use hash::*;
pub use manager::*;

use serde::{Deserialize, Serialize};

/// Progress of one exhaustive walk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopState {
    /// Index of the next combination to produce.
    pub global_index: u64,
    /// Hash of the inputs the index belongs to; empty before the first run.
    pub last_input_hash: String,
    pub is_completed: bool,
}

impl LoopState {
    /// Marks the walk finished and rewinds to the first combination.
    pub fn complete(&mut self) {
        self.is_completed = true;
        self.global_index = 0;
    }

    pub fn advance_to(&mut self, next_index: u64) {
        self.global_index = next_index;
        self.is_completed = false;
    }
}
