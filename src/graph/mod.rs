//! Core graph data structures

mod cross_ref;
mod passage;

pub use cross_ref::CrossRef;
pub use passage::{ParseReferenceError, Passage, PassageId, Reference};
