//! Prompt combination backends.
//!
//! Templates reference pools through `[n]` anchors, where `[1]` draws from `pool_1`.
//! [`PromptCombinationGenerator`] expands the whole cartesian product at once, while
//! [`ExhaustivePromptCombinator`] walks it one combination per execution using
//! mixed-radix addressing over the pool sizes.
pub mod cartesian;
pub mod exhaustive;
pub mod generator;
pub mod template;

pub use cartesian::*;
pub use exhaustive::*;
pub use generator::*;
pub use template::*;
