//! Common test utilities for traversal integration tests
//!
//! Builds citation graphs, either a hand-written fixture or seeded random
//! graphs, and checks the structural invariants every bundle must satisfy.

#![allow(dead_code)]

pub mod graph_builder;
pub mod invariants;

pub use graph_builder::{passage, random_graph, random_snapshot, verse_fixture, RandomGraphConfig};
pub use invariants::{assert_ring_invariants, assert_tree_invariants, ids};
