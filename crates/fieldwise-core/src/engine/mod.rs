//! Transformation engine: selection resolution, per-field strategies and the
//! recursive tree walk

mod resolver;
mod strategy;
mod walker;

pub use resolver::{resolve, FieldOperationMap};
pub use strategy::FieldStrategy;

pub(crate) use walker::NodeWalker;
