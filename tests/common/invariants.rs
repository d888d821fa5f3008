//! Structural checks shared by the integration tests

use std::collections::{HashMap, HashSet};
use verse_xref::{Passage, PassageId, RingBundle, RingConfig, TreeBundle};

pub fn ids(passages: &[Passage]) -> Vec<i64> {
    passages.iter().map(|p| p.id.get()).collect()
}

/// Rings are pairwise disjoint and within budget, and ring 0 holds the anchor
pub fn assert_ring_invariants(bundle: &RingBundle, config: &RingConfig) {
    let mut seen: HashSet<PassageId> = HashSet::new();
    for (tier, ring) in bundle.rings().iter().enumerate() {
        for p in ring.iter() {
            assert!(seen.insert(p.id), "passage {} repeated (ring {})", p.id, tier);
        }
    }

    assert!(bundle.ring0.len() <= 2 * config.ring0_radius as usize + 1);
    assert!(bundle.ring1.len() <= config.ring1_limit);
    assert!(bundle.ring2.len() <= config.ring2_limit);
    assert!(bundle.ring3.len() <= config.ring3_limit);
    assert!(bundle.len() <= config.max_passages());
    assert!(bundle.ring0.iter().any(|p| p.id == bundle.anchor.id));

    for link in &bundle.links {
        assert!(seen.contains(&link.from), "link source {} is not in the bundle", link.from);
        assert!(seen.contains(&link.to), "link target {} is not in the bundle", link.to);
    }
}

/// Root at depth 0, depth = parent depth + 1, no repeats, one edge per
/// non-root node, and a connected spine
pub fn assert_tree_invariants(tree: &TreeBundle) {
    let depth_of: HashMap<PassageId, usize> = tree.nodes.iter().map(|n| (n.id(), n.depth)).collect();
    assert_eq!(depth_of.len(), tree.nodes.len(), "a passage appears twice");

    let root = tree.get(tree.root_id).expect("root present");
    assert_eq!(root.depth, 0);
    assert_eq!(root.parent_id, None);

    for node in tree.nodes.iter().filter(|n| n.id() != tree.root_id) {
        let parent = node.parent_id.expect("non-root node has a parent");
        let parent_depth = depth_of.get(&parent).expect("parent present in bundle");
        assert_eq!(node.depth, parent_depth + 1);
    }

    assert_eq!(tree.edges.len(), tree.nodes.len() - 1);
    for edge in &tree.edges {
        let child = tree.get(edge.to).expect("edge child present");
        assert_eq!(child.parent_id, Some(edge.from));
        assert!(edge.weight > 0.0 && edge.weight <= 1.0);
    }

    let spine = tree.spine_path();
    assert_eq!(spine.first(), Some(&tree.root_id));
    assert_eq!(spine.len(), tree.max_depth() + 1, "spine reaches the deepest level");
    for pair in spine.windows(2) {
        assert_eq!(tree.get(pair[1]).and_then(|n| n.parent_id), Some(pair[0]));
    }
}
