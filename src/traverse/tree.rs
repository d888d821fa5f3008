//! Genealogy tree builder
//!
//! Level-order expansion from the anchor, one batch of store reads per
//! level. A single visited set spans the whole traversal, so a passage is
//! placed at most once no matter how many cycles lead back to it; the first
//! parent to reach it in frontier order keeps it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::engine::{TraversalError, TraversalResult};
use super::layer::{hydrate, try_hydrate};
use super::types::{edge_weight, SourceTier, TraversalMode, TraversalNode, TreeBundle, VisualEdge};
use crate::graph::{CrossRef, Passage, PassageId};
use crate::storage::{EdgeStore, GraphStore};

/// Budgets for the genealogy tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Deepest level expanded (root = 0)
    pub max_depth: usize,
    /// Total passages in the tree, root included
    pub max_nodes: usize,
    /// Children taken from each passage's citations
    pub max_children_per_node: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_nodes: 100,
            max_children_per_node: 5,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node budget only: unlimited depth and branching, 30 passages
    pub fn production() -> Self {
        Self {
            max_depth: usize::MAX,
            max_nodes: 30,
            max_children_per_node: usize::MAX,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn max_children(mut self, max_children_per_node: usize) -> Self {
        self.max_children_per_node = max_children_per_node;
        self
    }
}

/// A passage waiting to be placed, with the passage that reached it
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    id: PassageId,
    parent: Option<PassageId>,
}

/// Everything a traversal has placed so far.
///
/// Moved through each level and handed back, never shared.
#[derive(Debug, Default)]
struct TreeAccumulator {
    nodes: Vec<TraversalNode>,
    edges: Vec<VisualEdge>,
    visited: HashSet<PassageId>,
    /// Passages loaded by earlier levels, placed or not
    cache: HashMap<PassageId, Passage>,
    /// Ids the store did not return
    missing: HashSet<PassageId>,
}

impl TreeAccumulator {
    fn with_root(root: Passage) -> Self {
        let mut acc = Self::default();
        acc.cache.insert(root.id, root);
        acc
    }

    /// Load frontier passages until `remaining` of them are placeable.
    ///
    /// Walks the frontier in order and requests only the unknown ids that
    /// could still fit the budget. Ids the store does not return are marked
    /// missing and the walk is repeated, so dangling citations never leave
    /// the level short.
    async fn load_frontier<S>(mut self, store: &S, frontier: &[FrontierEntry], remaining: usize) -> Self
    where
        S: GraphStore + ?Sized,
    {
        loop {
            let mut wanted: Vec<PassageId> = Vec::new();
            let mut candidates: HashSet<PassageId> = HashSet::new();
            for entry in frontier {
                if candidates.len() >= remaining {
                    break;
                }
                if self.visited.contains(&entry.id) || self.missing.contains(&entry.id) {
                    continue;
                }
                if candidates.insert(entry.id) && !self.cache.contains_key(&entry.id) {
                    wanted.push(entry.id);
                }
            }
            if wanted.is_empty() {
                return self;
            }

            let loaded = hydrate(store, &wanted).await;
            for passage in loaded {
                self.cache.insert(passage.id, passage);
            }
            for id in wanted {
                if !self.cache.contains_key(&id) {
                    self.missing.insert(id);
                }
            }
        }
    }

    /// Place frontier passages at `depth` until the node budget runs out.
    ///
    /// Returns the ids placed at this level, in placement order.
    fn place_level(mut self, frontier: Vec<FrontierEntry>, depth: usize, max_nodes: usize) -> (Self, Vec<PassageId>) {
        let mut placed = Vec::new();

        for entry in frontier {
            if self.visited.len() >= max_nodes {
                break;
            }
            if self.visited.contains(&entry.id) {
                continue;
            }
            let Some(passage) = self.cache.get(&entry.id) else {
                continue;
            };

            self.visited.insert(entry.id);
            self.nodes
                .push(TraversalNode::new(passage.clone(), depth, entry.parent, SourceTier::Genealogy));
            if let Some(parent) = entry.parent {
                self.edges.push(VisualEdge::new(parent, entry.id, edge_weight(depth)));
            }
            placed.push(entry.id);
        }

        (self, placed)
    }

    fn into_bundle(self, root_id: PassageId) -> TreeBundle {
        TreeBundle {
            nodes: self.nodes,
            edges: self.edges,
            root_id,
            mode: TraversalMode::Genealogy,
        }
    }
}

/// Citation targets grouped per source, store order kept, duplicates removed.
///
/// Deduplicating before the per-passage cap is applied departs from taking
/// the first N raw targets: a repeated citation does not use up a child slot.
fn children_by_source(edges: &[CrossRef]) -> HashMap<PassageId, Vec<PassageId>> {
    let mut children: HashMap<PassageId, Vec<PassageId>> = HashMap::new();
    for edge in edges {
        let targets = children.entry(edge.from).or_default();
        if !targets.contains(&edge.to) {
            targets.push(edge.to);
        }
    }
    children
}

/// Next level's frontier: up to `max_children` unvisited citations of each
/// passage placed at this level, in placement then store order
async fn next_frontier<S>(
    store: &S,
    placed: &[PassageId],
    visited: &HashSet<PassageId>,
    max_children: usize,
) -> Vec<FrontierEntry>
where
    S: GraphStore + ?Sized,
{
    let edges = match store.get_outgoing(placed).await {
        Ok(edges) => edges,
        Err(e) => {
            warn!(error = %e, sources = placed.len(), "edge read failed; tree stops growing here");
            return Vec::new();
        }
    };
    let children = children_by_source(&edges);

    let mut frontier = Vec::new();
    for &parent in placed {
        let Some(targets) = children.get(&parent) else {
            continue;
        };
        for &target in targets.iter().take(max_children) {
            if !visited.contains(&target) {
                frontier.push(FrontierEntry {
                    id: target,
                    parent: Some(parent),
                });
            }
        }
    }
    frontier
}

/// Build the genealogy tree rooted at `anchor_id`.
///
/// Fails with [`TraversalError::AnchorNotFound`] when the anchor is not in
/// the passage store. A `max_nodes` of 0 is treated as 1: the root is
/// always present.
pub async fn build_tree<S>(store: &S, anchor_id: PassageId, config: &TreeConfig) -> TraversalResult<TreeBundle>
where
    S: GraphStore + ?Sized,
{
    let root = try_hydrate(store, &[anchor_id])
        .await?
        .into_iter()
        .next()
        .ok_or(TraversalError::AnchorNotFound(anchor_id))?;

    let max_nodes = config.max_nodes.max(1);
    let mut acc = TreeAccumulator::with_root(root);
    let mut frontier = vec![FrontierEntry {
        id: anchor_id,
        parent: None,
    }];
    let mut depth = 0;

    while depth <= config.max_depth && !frontier.is_empty() && acc.visited.len() < max_nodes {
        let remaining = max_nodes - acc.visited.len();
        acc = acc.load_frontier(store, &frontier, remaining).await;

        let (next_acc, placed) = acc.place_level(frontier, depth, max_nodes);
        acc = next_acc;
        debug!(anchor = %anchor_id, depth, placed = placed.len(), total = acc.visited.len(), "tree level");

        if depth == config.max_depth || acc.visited.len() >= max_nodes {
            break;
        }

        frontier = next_frontier(store, &placed, &acc.visited, config.max_children_per_node).await;
        depth += 1;
    }

    Ok(acc.into_bundle(anchor_id))
}
