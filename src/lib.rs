//! # Exhaustive - Dynamic Pool Slots and Prompt Combination Backends
//!
//! **Exhaustive** models the extensions a node-graph editor plugin installs to give one
//! node type a variable number of numbered input slots (`pool_1`, `pool_2`, ...), plus
//! the backend nodes those pools feed.
//!
//! The editor itself is never owned by this crate. It is reached through the
//! [`graph::HostNode`] and [`graph::HostGraph`] traits; [`graph::Graph`] is an in-memory
//! implementation and [`editor::Editor`] wires it to the extensions.
//!
//! ## Core Workflow
//!
//! 1.  **Register**: extensions are registered with the [`lifecycle::ExtensionRegistry`],
//!     then node definitions. The dynamic pools extension attaches a listener to the
//!     designated node type.
//! 2.  **React**: connection, creation, configure and graph-loaded events run through the
//!     node type's listener chain; the pool listener requests a deferred reconciliation.
//! 3.  **Reconcile**: once the host has settled, the [`reconciler::SlotReconciler`] keeps
//!     exactly one free pool slot after the highest connected one, up to the maximum.
//! 4.  **Generate**: the backend expands the template and pools into combinations and
//!     signals the editor to queue the next run.
//!
//! ## Quick Start
//!
//! ```rust
//! use exhaustive::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::default();
//!     let mut editor = Editor::new(&config)?;
//!
//!     let generator = editor.add_node("PromptCombinationGenerator")?;
//!     let text = editor.add_node("MultiLineTextInput")?;
//!     editor.settle();
//!
//!     editor
//!         .connect(text, 0, generator, "pool_1")
//!         .ok_or("pool_1 is missing")?;
//!     editor.settle();
//!
//!     let node = editor.node(generator).ok_or("generator vanished")?;
//!     assert_eq!(node.input_names(), vec!["pool_1", "pool_2"]);
//!     Ok(())
//! }
//! ```

pub mod combinator;
pub mod config;
pub mod editor;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod logging;
pub mod prelude;
pub mod queue;
pub mod reconciler;
pub mod signal;
pub mod state;

#[cfg(feature = "python-bindings")]
mod python;
