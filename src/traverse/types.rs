//! Traversal output types
//!
//! Everything here is created by a single traversal call and handed to the
//! caller; nothing is retained between calls.

use crate::graph::{CrossRef, Passage, PassageId};
use serde::Serialize;

/// Weight lost per level of depth on a visual edge
pub const DEPTH_WEIGHT_STEP: f32 = 0.15;

/// Floor applied to visual edge weights so they stay in (0, 1]
pub const MIN_EDGE_WEIGHT: f32 = 0.05;

/// Display weight of an edge whose child sits at `depth`
///
/// `1.0 - depth * 0.15`, floored at [`MIN_EDGE_WEIGHT`]. Strictly decreasing
/// down to depth 6; everything deeper shares the floor.
pub fn edge_weight(depth: usize) -> f32 {
    (1.0 - depth as f32 * DEPTH_WEIGHT_STEP).max(MIN_EDGE_WEIGHT)
}

/// Which part of a traversal produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Anchor,
    Ring0,
    Ring1,
    Ring2,
    Ring3,
    Genealogy,
}

/// Which builder produced a tree bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    Genealogy,
    Ring,
}

/// A passage with the metadata a traversal attaches to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversalNode {
    #[serde(flatten)]
    pub passage: Passage,
    /// Hops from the root (root = 0)
    pub depth: usize,
    pub parent_id: Option<PassageId>,
    pub is_spine: bool,
    pub is_visible: bool,
    /// Direct children not currently visible
    pub collapsed_child_count: usize,
    pub source_tier: SourceTier,
}

impl TraversalNode {
    pub fn new(passage: Passage, depth: usize, parent_id: Option<PassageId>, source_tier: SourceTier) -> Self {
        Self {
            passage,
            depth,
            parent_id,
            is_spine: false,
            is_visible: false,
            collapsed_child_count: 0,
            source_tier,
        }
    }

    pub fn id(&self) -> PassageId {
        self.passage.id
    }
}

/// A parent to child link included in a tree bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualEdge {
    pub from: PassageId,
    pub to: PassageId,
    pub weight: f32,
}

impl VisualEdge {
    pub fn new(from: PassageId, to: PassageId, weight: f32) -> Self {
        Self { from, to, weight }
    }
}

/// Four-tier context bundle built by the ring walker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingBundle {
    pub anchor: Passage,
    /// Id-range window around the anchor, including the anchor, ordered by id
    pub ring0: Vec<Passage>,
    pub ring1: Vec<Passage>,
    pub ring2: Vec<Passage>,
    pub ring3: Vec<Passage>,
    /// For every passage in rings 1 to 3, the citation that first reached it
    pub links: Vec<CrossRef>,
}

impl RingBundle {
    /// Total number of distinct passages across the four rings
    pub fn len(&self) -> usize {
        self.ring0.len() + self.ring1.len() + self.ring2.len() + self.ring3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rings in order, ring 0 first
    pub fn rings(&self) -> [&[Passage]; 4] {
        [&self.ring0, &self.ring1, &self.ring2, &self.ring3]
    }
}

/// Hierarchical bundle rooted at the anchor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeBundle {
    pub nodes: Vec<TraversalNode>,
    pub edges: Vec<VisualEdge>,
    pub root_id: PassageId,
    pub mode: TraversalMode,
}

impl TreeBundle {
    pub fn get(&self, id: PassageId) -> Option<&TraversalNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Deepest level present, 0 for a root-only tree
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Ids of spine nodes ordered from root to leaf
    pub fn spine_path(&self) -> Vec<PassageId> {
        let mut spine: Vec<&TraversalNode> = self.nodes.iter().filter(|n| n.is_spine).collect();
        spine.sort_by_key(|n| n.depth);
        spine.into_iter().map(|n| n.id()).collect()
    }
}
