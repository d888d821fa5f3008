//! Spine selection: the root-to-deepest-leaf highlight

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::types::TraversalNode;
use crate::graph::PassageId;

/// Mark the path from `root_id` to the deepest node as the spine.
///
/// The deepest node is the first one at maximum depth. Every node on its
/// parent chain, plus the root, gets `is_spine = true`; all others are
/// cleared. An empty node list is a no-op.
pub fn mark_spine(nodes: &mut [TraversalNode], root_id: PassageId) {
    let Some(deepest) = nodes
        .iter()
        .fold(None::<&TraversalNode>, |best, node| match best {
            Some(b) if b.depth >= node.depth => Some(b),
            _ => Some(node),
        })
        .map(TraversalNode::id)
    else {
        warn!(root = %root_id, "no traversal nodes; spine left empty");
        return;
    };

    let parent_of: HashMap<PassageId, Option<PassageId>> = nodes.iter().map(|n| (n.id(), n.parent_id)).collect();

    let mut path: HashSet<PassageId> = HashSet::from([root_id]);
    let mut cursor = Some(deepest);
    // A parent chain can be at most as long as the node list
    for _ in 0..nodes.len() {
        let Some(id) = cursor else {
            break;
        };
        path.insert(id);
        if id == root_id {
            break;
        }
        cursor = parent_of.get(&id).copied().flatten();
    }

    for node in nodes.iter_mut() {
        node.is_spine = path.contains(&node.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Passage;
    use crate::traverse::types::SourceTier;

    fn node(id: i64, depth: usize, parent: Option<i64>) -> TraversalNode {
        let passage = Passage::new(id, "JHN", "John", 1, id, "");
        TraversalNode::new(passage, depth, parent.map(PassageId::new), SourceTier::Genealogy)
    }

    fn spine_ids(nodes: &[TraversalNode]) -> Vec<i64> {
        nodes.iter().filter(|n| n.is_spine).map(|n| n.id().get()).collect()
    }

    #[test]
    fn marks_path_to_first_deepest_node() {
        //      1
        //    /   \
        //   2     3
        //   |     |
        //   4     5
        let mut nodes = vec![
            node(1, 0, None),
            node(2, 1, Some(1)),
            node(3, 1, Some(1)),
            node(4, 2, Some(2)),
            node(5, 2, Some(3)),
        ];

        mark_spine(&mut nodes, PassageId::new(1));

        assert_eq!(spine_ids(&nodes), vec![1, 2, 4]);
    }

    #[test]
    fn root_only_tree_marks_root() {
        let mut nodes = vec![node(1, 0, None)];
        mark_spine(&mut nodes, PassageId::new(1));
        assert_eq!(spine_ids(&nodes), vec![1]);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut nodes: Vec<TraversalNode> = Vec::new();
        mark_spine(&mut nodes, PassageId::new(1));
        assert!(nodes.is_empty());
    }

    #[test]
    fn remarking_clears_stale_flags() {
        let mut nodes = vec![node(1, 0, None), node(2, 1, Some(1)), node(3, 1, Some(1))];
        nodes[2].is_spine = true;

        mark_spine(&mut nodes, PassageId::new(1));

        assert_eq!(spine_ids(&nodes), vec![1, 2]);
    }

    #[test]
    fn parent_cycle_does_not_hang() {
        // Malformed input: 2 and 3 point at each other
        let mut nodes = vec![node(1, 0, None), node(2, 2, Some(3)), node(3, 1, Some(2))];

        mark_spine(&mut nodes, PassageId::new(1));

        assert_eq!(spine_ids(&nodes), vec![1, 2, 3]);
    }
}
