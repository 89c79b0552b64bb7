//! Backend-to-UI signalling: the wire types, backend sinks and the UI-side router.
pub mod router;
pub mod sink;
pub mod types;

pub use router::*;
pub use sink::*;
pub use types::*;
