//! The slice of the host editor's object model that the extensions work against.
pub mod definition;
pub mod memory;
pub mod node;
pub mod slot;

pub use definition::*;
pub use memory::*;
pub use node::*;
pub use slot::*;
