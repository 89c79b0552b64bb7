//! Prelude module for convenient imports
//!
//! Re-exports the types most embedders need: the editor session, the host traits, the
//! reconciler and the backend nodes.
//!
//! # Example
//!
//! ```rust
//! use exhaustive::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let generator = PromptCombinationGenerator::new(15);
//! let mut pools = PoolInputs::new();
//! pools.insert(1, "cat\ndog".to_string());
//!
//! let out = generator.execute("a [1]", &pools)?;
//! assert_eq!(out.combinations, vec!["a cat", "a dog"]);
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```

// Editor session and host model
pub use crate::editor::{Editor, Workflow};
pub use crate::graph::{Graph, GraphNode, HostGraph, HostNode, NodeDefinition, NodeId, Slot};

// Reconciliation and lifecycle
pub use crate::lifecycle::{DeferredScheduler, Extension, ExtensionRegistry, LifecycleEvent};
pub use crate::reconciler::{ReconcileOutcome, SlotReconciler};

// Signals
pub use crate::signal::{Signal, SignalRouter, SignalSink};

// Backend nodes
pub use crate::combinator::{
    CombinatorInputs, ExhaustivePromptCombinator, PoolInputs, PromptCombinationGenerator,
};
pub use crate::queue::{AutoQueue, AutoQueueLoopController, ChangeToken, IndexMode, LoopInputs};
pub use crate::state::{LoopState, StateManager};

// Configuration and errors
pub use crate::config::Config;
pub use crate::error::{ConfigError, HostError, RegistryError, StateError, TemplateError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
