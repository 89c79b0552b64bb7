//! Editor lifecycle plumbing: events, listener chains, deferred scheduling and the
//! extension registry.
pub mod event;
pub mod listener;
pub mod pools;
pub mod registry;
pub mod scheduler;

pub use event::*;
pub use listener::*;
pub use pools::*;
pub use registry::*;
pub use scheduler::*;
