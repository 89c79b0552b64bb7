//! Self-requeueing for backend nodes.
//!
//! A node walking a combination space produces one item per execution and then asks
//! the editor to queue the workflow again, until the walk is finished.
pub mod auto_queue;
pub mod loop_controller;

pub use auto_queue::*;
pub use loop_controller::*;

use std::fmt;

/// Tells the host whether a node's cached output may be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeToken {
    /// Always execute again; the host must never reuse a cached result.
    Always,
    /// Nothing changed since the last execution.
    Unchanged,
    /// Reuse the cached result while this value stays the same.
    Hash(String),
}

impl ChangeToken {
    pub fn forces_execution(&self) -> bool {
        matches!(self, ChangeToken::Always)
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeToken::Always => write!(f, "always"),
            ChangeToken::Unchanged => write!(f, "unchanged"),
            ChangeToken::Hash(hash) => write!(f, "{}", hash),
        }
    }
}
