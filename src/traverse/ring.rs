//! Ring walker: four budgeted tiers around an anchor
//!
//! Ring 0 is the id-range window around the anchor. Rings 1 to 3 are
//! successive layers of citations, each ranked by citation frequency and
//! excluded from every later ring, so the four rings are pairwise disjoint
//! and bounded by `2 * radius + 1 + ring1_limit + ring2_limit + ring3_limit`
//! no matter how large the graph is.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{TraversalError, TraversalResult};
use super::layer::{fetch_ranked_layer, hydrate, LayerHit};
use super::types::{edge_weight, RingBundle, SourceTier, TraversalMode, TraversalNode, TreeBundle, VisualEdge};
use crate::graph::{CrossRef, Passage, PassageId};
use crate::storage::{GraphStore, PassageStore};

/// Budgets for the ring walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Passages on each side of the anchor in ring 0
    pub ring0_radius: u32,
    pub ring1_limit: usize,
    pub ring2_limit: usize,
    pub ring3_limit: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            ring0_radius: 3,
            ring1_limit: 20,
            ring2_limit: 30,
            ring3_limit: 40,
        }
    }
}

impl RingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ring 0 window radius
    pub fn radius(mut self, radius: u32) -> Self {
        self.ring0_radius = radius;
        self
    }

    /// Set the size limits of rings 1, 2 and 3
    pub fn limits(mut self, ring1: usize, ring2: usize, ring3: usize) -> Self {
        self.ring1_limit = ring1;
        self.ring2_limit = ring2;
        self.ring3_limit = ring3;
        self
    }

    /// Hard upper bound on the number of passages in a bundle
    pub fn max_passages(&self) -> usize {
        2 * self.ring0_radius as usize + 1 + self.ring1_limit + self.ring2_limit + self.ring3_limit
    }
}

/// Rank the next ring from `sources`, skipping everything already placed.
///
/// Takes the placed set by value and hands it back extended with the new
/// ring, so each tier sees exactly what earlier tiers claimed.
async fn next_ring<S>(
    store: &S,
    sources: &[PassageId],
    limit: usize,
    mut placed: HashSet<PassageId>,
) -> (Vec<LayerHit>, HashSet<PassageId>)
where
    S: GraphStore + ?Sized,
{
    let hits: Vec<LayerHit> = fetch_ranked_layer(store, sources, limit, &placed)
        .await
        .into_iter()
        .filter(|hit| !placed.contains(&hit.id))
        .collect();
    placed.extend(hits.iter().map(|hit| hit.id));
    (hits, placed)
}

fn hit_ids(hits: &[LayerHit]) -> Vec<PassageId> {
    hits.iter().map(|hit| hit.id).collect()
}

/// Citations that placed the hydrated passages of one ring
fn ring_links(hits: &[LayerHit], hydrated: &[Passage]) -> Vec<CrossRef> {
    let present: HashSet<PassageId> = hydrated.iter().map(|p| p.id).collect();
    hits.iter()
        .filter(|hit| present.contains(&hit.id))
        .map(|hit| CrossRef::new(hit.via, hit.id))
        .collect()
}

/// Build the four-ring context bundle around `anchor_id`.
///
/// Fails with [`TraversalError::AnchorNotFound`] when the anchor is not in
/// the passage store. Reads for rings 1 to 3 degrade to empty on failure.
pub async fn build_ring_bundle<S>(store: &S, anchor_id: PassageId, config: &RingConfig) -> TraversalResult<RingBundle>
where
    S: GraphStore + ?Sized,
{
    let radius = i64::from(config.ring0_radius);
    let ring0 = store
        .get_by_range(anchor_id.offset(-radius), anchor_id.offset(radius))
        .await?;

    let anchor = ring0
        .iter()
        .find(|p| p.id == anchor_id)
        .cloned()
        .ok_or(TraversalError::AnchorNotFound(anchor_id))?;

    let ring0_ids: Vec<PassageId> = ring0.iter().map(|p| p.id).collect();
    let placed: HashSet<PassageId> = ring0_ids.iter().copied().collect();
    debug!(anchor = %anchor_id, size = ring0.len(), "ring 0");

    let (ring1_hits, placed) = next_ring(store, &ring0_ids, config.ring1_limit, placed).await;
    let ring1_ids = hit_ids(&ring1_hits);

    // Hydrating a ring and ranking the next one read disjoint data
    let (ring1, (ring2_hits, placed)) = tokio::join!(
        hydrate(store, &ring1_ids),
        next_ring(store, &ring1_ids, config.ring2_limit, placed),
    );
    debug!(anchor = %anchor_id, size = ring1.len(), "ring 1");
    let ring2_ids = hit_ids(&ring2_hits);

    let (ring2, (ring3_hits, _placed)) = tokio::join!(
        hydrate(store, &ring2_ids),
        next_ring(store, &ring2_ids, config.ring3_limit, placed),
    );
    debug!(anchor = %anchor_id, size = ring2.len(), "ring 2");

    let ring3 = hydrate(store, &hit_ids(&ring3_hits)).await;
    debug!(anchor = %anchor_id, size = ring3.len(), "ring 3");

    let links = [
        ring_links(&ring1_hits, &ring1),
        ring_links(&ring2_hits, &ring2),
        ring_links(&ring3_hits, &ring3),
    ]
    .concat();

    Ok(RingBundle {
        anchor,
        ring0,
        ring1,
        ring2,
        ring3,
        links,
    })
}

impl RingBundle {
    /// Project the rings onto a tree rooted at the anchor.
    ///
    /// Ring 0 neighbors hang off the anchor; every later passage hangs off the
    /// passage that first cited it. A passage whose citing passage could not
    /// be loaded has no place in the tree and is left out.
    pub fn into_tree(self) -> TreeBundle {
        let root_id = self.anchor.id;
        let via: HashMap<PassageId, PassageId> = self.links.iter().map(|link| (link.to, link.from)).collect();

        let mut depth_of: HashMap<PassageId, usize> = HashMap::from([(root_id, 0)]);
        let mut nodes = vec![TraversalNode::new(self.anchor, 0, None, SourceTier::Anchor)];
        let mut edges = Vec::new();

        let mut attach = |passage: Passage, parent: PassageId, tier: SourceTier| {
            if depth_of.contains_key(&passage.id) {
                return;
            }
            let Some(&parent_depth) = depth_of.get(&parent) else {
                return;
            };
            let depth = parent_depth + 1;
            depth_of.insert(passage.id, depth);
            edges.push(VisualEdge::new(parent, passage.id, edge_weight(depth)));
            nodes.push(TraversalNode::new(passage, depth, Some(parent), tier));
        };

        for passage in self.ring0 {
            attach(passage, root_id, SourceTier::Ring0);
        }
        for (tier, ring) in [
            (SourceTier::Ring1, self.ring1),
            (SourceTier::Ring2, self.ring2),
            (SourceTier::Ring3, self.ring3),
        ] {
            for passage in ring {
                if let Some(&parent) = via.get(&passage.id) {
                    attach(passage, parent, tier);
                }
            }
        }

        TreeBundle {
            nodes,
            edges,
            root_id,
            mode: TraversalMode::Ring,
        }
    }
}
