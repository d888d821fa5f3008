//! XrefEngine: the entry point for traversals
//!
//! The engine owns an injected store handle and a traversal configuration.
//! It keeps no traversal state between calls; every call is an independent
//! read of whatever the store holds at that moment.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::ring::build_ring_bundle;
use super::spine::mark_spine;
use super::tree::{build_tree, TreeConfig};
use super::types::{RingBundle, TreeBundle};
use super::visibility::compute_visibility;
use crate::config::TraversalConfig;
use crate::graph::{PassageId, Reference};
use crate::storage::{GraphStore, PassageStore, StorageError};

/// Errors that can occur in traversal operations
#[derive(Debug, Error)]
pub enum TraversalError {
    /// The caller gave an anchor the passage store does not hold
    #[error("Anchor passage not found: {0}")]
    AnchorNotFound(PassageId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for traversal operations
pub type TraversalResult<T> = Result<T, TraversalError>;

/// Runs traversals against a shared store
pub struct XrefEngine<S: GraphStore + ?Sized> {
    store: Arc<S>,
    config: TraversalConfig,
}

impl<S: GraphStore + ?Sized> Clone for XrefEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: GraphStore + ?Sized> XrefEngine<S> {
    /// Create an engine with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, TraversalConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: TraversalConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Four-ring context bundle around `anchor`
    pub async fn ring_bundle(&self, anchor: PassageId) -> TraversalResult<RingBundle> {
        let bundle = build_ring_bundle(self.store.as_ref(), anchor, &self.config.ring).await?;
        debug!(anchor = %anchor, passages = bundle.len(), "ring bundle built");
        Ok(bundle)
    }

    /// Ring bundle projected onto a tree, with the spine marked
    pub async fn ring_tree(&self, anchor: PassageId) -> TraversalResult<TreeBundle> {
        let mut tree = self.ring_bundle(anchor).await?.into_tree();
        mark_spine(&mut tree.nodes, tree.root_id);
        Ok(tree)
    }

    /// Genealogy tree with the configured budgets, spine and visibility computed
    pub async fn genealogy(&self, anchor: PassageId) -> TraversalResult<TreeBundle> {
        let config = self.config.tree;
        self.genealogy_with(anchor, &config).await
    }

    /// Genealogy tree with explicit budgets
    pub async fn genealogy_with(&self, anchor: PassageId, config: &TreeConfig) -> TraversalResult<TreeBundle> {
        let mut tree = build_tree(self.store.as_ref(), anchor, config).await?;
        mark_spine(&mut tree.nodes, tree.root_id);
        compute_visibility(&mut tree.nodes, &tree.edges);
        debug!(anchor = %anchor, nodes = tree.nodes.len(), depth = tree.max_depth(), "genealogy tree built");
        Ok(tree)
    }

    /// Look up the passage id for a `(collection, chapter, item)` reference
    pub async fn resolve_reference(&self, reference: &Reference) -> TraversalResult<Option<PassageId>> {
        Ok(self.store.get_by_reference(reference).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CrossRef, Passage};
    use crate::storage::GraphSnapshot;
    use crate::traverse::ring::RingConfig;

    fn passage(id: i64) -> Passage {
        Passage::new(id, "GEN", "Genesis", 1, id, format!("genesis 1:{}", id))
    }

    fn engine() -> XrefEngine<GraphSnapshot> {
        let snap = GraphSnapshot::from_parts(
            (1..=20).map(passage),
            vec![
                CrossRef::new(10, 15),
                CrossRef::new(15, 18),
                CrossRef::new(15, 2),
                CrossRef::new(18, 10),
            ],
        );
        XrefEngine::new(Arc::new(snap))
    }

    #[tokio::test]
    async fn genealogy_marks_spine_and_visibility() {
        let tree = engine().genealogy(PassageId::new(10)).await.unwrap();

        assert_eq!(tree.spine_path(), vec![PassageId::new(10), PassageId::new(15), PassageId::new(18)]);

        let n15 = tree.get(PassageId::new(15)).unwrap();
        assert!(n15.is_visible);
        // 2 is a collapsed sibling of 18
        assert_eq!(n15.collapsed_child_count, 1);
        assert!(!tree.get(PassageId::new(2)).unwrap().is_visible);
    }

    #[tokio::test]
    async fn ring_tree_marks_spine() {
        let engine = XrefEngine::with_config(
            engine().store().clone(),
            TraversalConfig {
                ring: RingConfig::new().radius(0),
                ..TraversalConfig::default()
            },
        );

        let tree = engine.ring_tree(PassageId::new(10)).await.unwrap();

        // 10 -> 15 (ring 1) -> 18 (ring 2); 2 is also ring 2 but later
        assert_eq!(tree.spine_path(), vec![PassageId::new(10), PassageId::new(15), PassageId::new(18)]);
    }

    #[tokio::test]
    async fn resolve_reference_uses_alternate_key() {
        let id = engine()
            .resolve_reference(&Reference::new("GEN", 1, 15))
            .await
            .unwrap();
        assert_eq!(id, Some(PassageId::new(15)));
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let engine = engine();
        let a = engine.ring_bundle(PassageId::new(10)).await.unwrap();
        let b = engine.ring_bundle(PassageId::new(10)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[tokio::test]
    async fn unknown_anchor_surfaces_as_error() {
        let err = engine().genealogy(PassageId::new(500)).await.unwrap_err();
        assert_eq!(err.to_string(), "Anchor passage not found: 500");
    }
}
