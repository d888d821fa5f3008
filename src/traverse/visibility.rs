//! Progressive-disclosure flags for genealogy trees

use std::collections::HashMap;

use super::types::{TraversalNode, VisualEdge};
use crate::graph::PassageId;

/// Show the spine, collapse everything else, and count hidden children.
///
/// Afterwards `is_visible == is_spine` for every node, and
/// `collapsed_child_count` is the number of the node's direct children
/// (edges with `from == node`) that are not visible. Expanding a node and
/// recounting is left to the UI.
pub fn compute_visibility(nodes: &mut [TraversalNode], edges: &[VisualEdge]) {
    for node in nodes.iter_mut() {
        node.is_visible = node.is_spine;
    }

    let visible: HashMap<PassageId, bool> = nodes.iter().map(|n| (n.id(), n.is_visible)).collect();

    let mut hidden_children: HashMap<PassageId, usize> = HashMap::new();
    for edge in edges {
        if visible.get(&edge.to) == Some(&false) {
            *hidden_children.entry(edge.from).or_default() += 1;
        }
    }

    for node in nodes.iter_mut() {
        node.collapsed_child_count = hidden_children.get(&node.id()).copied().unwrap_or(0);
    }
}
