//! verse-xref: Cross-Reference Graph Traversal
//!
//! Reads a citation graph of short passages and returns small, deterministic,
//! budget-bounded subgraphs around an anchor passage, for a text-generation
//! consumer and a tree-visualization UI.
//!
//! # Core Concepts
//!
//! - **Passages**: read-only nodes, identified by a reading-order integer id
//! - **Cross references**: directed, unweighted citation edges
//! - **Ring bundle**: the anchor's neighborhood plus three frequency-ranked citation tiers
//! - **Genealogy tree**: a level-order spanning tree with a highlighted spine
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use verse_xref::{CrossRef, GraphSnapshot, Passage, PassageId, XrefEngine};
//!
//! # tokio_test::block_on(async {
//! let snapshot = GraphSnapshot::from_parts(
//!     vec![
//!         Passage::new(1, "GEN", "Genesis", 1, 1, "In the beginning"),
//!         Passage::new(2, "JHN", "John", 1, 1, "In the beginning was the Word"),
//!     ],
//!     vec![CrossRef::new(1, 2)],
//! );
//! let engine = XrefEngine::new(Arc::new(snapshot));
//!
//! let tree = engine.genealogy(PassageId::new(1)).await.unwrap();
//! assert_eq!(tree.nodes.len(), 2);
//! # });
//! ```

pub mod config;
mod graph;
pub mod storage;
pub mod traverse;

pub use config::{ConfigError, TraversalConfig};
pub use graph::{CrossRef, ParseReferenceError, Passage, PassageId, Reference};
pub use storage::{EdgeStore, GraphSnapshot, GraphStore, PassageStore, SnapshotHandle, SqliteStore, StorageError, StorageResult};
pub use traverse::{
    RingBundle, RingConfig, SourceTier, TraversalError, TraversalMode, TraversalNode, TraversalResult, TreeBundle,
    TreeConfig, VisualEdge, XrefEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
