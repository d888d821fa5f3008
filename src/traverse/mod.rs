//! Budgeted traversals of the citation graph
//!
//! Two builders share the layer fetcher and hydrator:
//! - the ring walker produces a four-tier [`RingBundle`]
//! - the genealogy builder produces a level-order [`TreeBundle`]
//!
//! Either result can then be post-processed by the spine selector, and
//! genealogy trees by the visibility calculator.

mod engine;
mod layer;
mod ring;
mod spine;
mod tree;
mod types;
mod visibility;

pub use engine::{TraversalError, TraversalResult, XrefEngine};
pub use layer::{fetch_layer, fetch_ranked_layer, hydrate, try_hydrate, LayerHit};
pub use ring::{build_ring_bundle, RingConfig};
pub use spine::mark_spine;
pub use tree::{build_tree, TreeConfig};
pub use types::{
    edge_weight, RingBundle, SourceTier, TraversalMode, TraversalNode, TreeBundle, VisualEdge, DEPTH_WEIGHT_STEP,
    MIN_EDGE_WEIGHT,
};
pub use visibility::compute_visibility;
