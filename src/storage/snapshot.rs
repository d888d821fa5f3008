//! In-memory graph snapshot
//!
//! A `GraphSnapshot` is an immutable copy of the passage and edge stores,
//! built once by the composition root and handed to the engine. A
//! `SnapshotHandle` lets the owner swap in a fresh snapshot.
//!
//! Each read through the handle resolves `current()` on its own, so a
//! refresh in the middle of a traversal can mix two snapshots. To pin one
//! snapshot per traversal, build the engine over `handle.current().await`
//! instead of over the handle.

use super::sqlite::SqliteStore;
use super::traits::{EdgeStore, PassageStore, StorageResult};
use crate::graph::{CrossRef, Passage, PassageId, Reference};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Immutable in-memory passage and edge store
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    passages: BTreeMap<PassageId, Passage>,
    by_reference: HashMap<Reference, PassageId>,
    edges: Vec<CrossRef>,
    /// Positions into `edges`, per source, ascending
    outgoing: HashMap<PassageId, Vec<usize>>,
}

impl GraphSnapshot {
    /// Build a snapshot from passages and edges.
    ///
    /// Edge order is preserved and becomes the store order reported by
    /// `get_outgoing`. A later passage with the same id replaces an earlier one.
    pub fn from_parts(passages: impl IntoIterator<Item = Passage>, edges: impl IntoIterator<Item = CrossRef>) -> Self {
        let mut snapshot = Self::default();

        for passage in passages {
            snapshot.by_reference.insert(passage.reference(), passage.id);
            snapshot.passages.insert(passage.id, passage);
        }

        for (position, edge) in edges.into_iter().enumerate() {
            snapshot.outgoing.entry(edge.from).or_default().push(position);
            snapshot.edges.push(edge);
        }

        snapshot
    }

    /// Load the full contents of a SQLite store
    pub fn load(store: &SqliteStore) -> StorageResult<Self> {
        let passages = store.load_all_passages()?;
        let edges = store.load_all_cross_refs()?;
        tracing::debug!(passages = passages.len(), edges = edges.len(), "loaded graph snapshot");
        Ok(Self::from_parts(passages, edges))
    }

    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[async_trait]
impl PassageStore for GraphSnapshot {
    async fn get_by_ids(&self, ids: &[PassageId]) -> StorageResult<Vec<Passage>> {
        Ok(ids.iter().filter_map(|id| self.passages.get(id).cloned()).collect())
    }

    async fn get_by_range(&self, lo: PassageId, hi: PassageId) -> StorageResult<Vec<Passage>> {
        if lo > hi {
            return Ok(Vec::new());
        }
        Ok(self.passages.range(lo..=hi).map(|(_, p)| p.clone()).collect())
    }

    async fn get_by_reference(&self, reference: &Reference) -> StorageResult<Option<PassageId>> {
        Ok(self.by_reference.get(reference).copied())
    }
}

#[async_trait]
impl EdgeStore for GraphSnapshot {
    async fn get_outgoing(&self, source_ids: &[PassageId]) -> StorageResult<Vec<CrossRef>> {
        let mut positions: Vec<usize> = source_ids
            .iter()
            .filter_map(|id| self.outgoing.get(id))
            .flatten()
            .copied()
            .collect();
        // Global insertion order, and each source counted once even if repeated
        positions.sort_unstable();
        positions.dedup();
        Ok(positions.into_iter().map(|i| self.edges[i]).collect())
    }
}

/// Shared, refreshable handle to the current snapshot
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    current: RwLock<Arc<GraphSnapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot traversals should read from right now
    pub async fn current(&self) -> Arc<GraphSnapshot> {
        self.current.read().await.clone()
    }

    /// Replace the snapshot. Readers holding the previous one keep it.
    pub async fn replace(&self, snapshot: GraphSnapshot) {
        *self.current.write().await = Arc::new(snapshot);
    }

    /// Reload from a SQLite store and swap it in
    pub async fn refresh_from(&self, store: &SqliteStore) -> StorageResult<()> {
        let snapshot = GraphSnapshot::load(store)?;
        self.replace(snapshot).await;
        Ok(())
    }
}

#[async_trait]
impl PassageStore for SnapshotHandle {
    async fn get_by_ids(&self, ids: &[PassageId]) -> StorageResult<Vec<Passage>> {
        self.current().await.get_by_ids(ids).await
    }

    async fn get_by_range(&self, lo: PassageId, hi: PassageId) -> StorageResult<Vec<Passage>> {
        self.current().await.get_by_range(lo, hi).await
    }

    async fn get_by_reference(&self, reference: &Reference) -> StorageResult<Option<PassageId>> {
        self.current().await.get_by_reference(reference).await
    }
}

#[async_trait]
impl EdgeStore for SnapshotHandle {
    async fn get_outgoing(&self, source_ids: &[PassageId]) -> StorageResult<Vec<CrossRef>> {
        self.current().await.get_outgoing(source_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: i64) -> Passage {
        Passage::new(id, "PSA", "Psalms", 1, id, format!("psalm {}", id))
    }

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::from_parts(
            (1..=5).map(passage),
            vec![
                CrossRef::new(3, 1),
                CrossRef::new(1, 4),
                CrossRef::new(3, 5),
                CrossRef::new(1, 4),
            ],
        )
    }

    #[tokio::test]
    async fn get_outgoing_follows_insertion_order() {
        let snap = snapshot();
        let edges = snap
            .get_outgoing(&[PassageId::new(1), PassageId::new(3), PassageId::new(1)])
            .await
            .unwrap();
        assert_eq!(
            edges,
            vec![
                CrossRef::new(3, 1),
                CrossRef::new(1, 4),
                CrossRef::new(3, 5),
                CrossRef::new(1, 4),
            ]
        );
    }

    #[tokio::test]
    async fn get_by_ids_drops_missing() {
        let snap = snapshot();
        let found = snap.get_by_ids(&[PassageId::new(2), PassageId::new(42)]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, PassageId::new(2));
    }

    #[tokio::test]
    async fn get_by_range_handles_inverted_bounds() {
        let snap = snapshot();
        let range = snap.get_by_range(PassageId::new(2), PassageId::new(4)).await.unwrap();
        assert_eq!(range.iter().map(|p| p.id.get()).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(snap.get_by_range(PassageId::new(4), PassageId::new(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_by_reference() {
        let snap = snapshot();
        let id = snap.get_by_reference(&Reference::new("PSA", 1, 3)).await.unwrap();
        assert_eq!(id, Some(PassageId::new(3)));
    }

    #[tokio::test]
    async fn handle_replace_does_not_disturb_held_snapshot() {
        let handle = SnapshotHandle::new(snapshot());
        let held = handle.current().await;

        handle.replace(GraphSnapshot::default()).await;

        assert_eq!(held.passage_count(), 5);
        assert_eq!(handle.current().await.passage_count(), 0);
        assert!(handle.get_by_ids(&[PassageId::new(1)]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handle_refreshes_from_sqlite() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_passages(&[passage(1), passage(2)]).unwrap();
        store.insert_cross_refs(&[CrossRef::new(1, 2)]).unwrap();

        let handle = SnapshotHandle::default();
        handle.refresh_from(&store).await.unwrap();

        let current = handle.current().await;
        assert_eq!(current.passage_count(), 2);
        assert_eq!(current.edge_count(), 1);
    }
}
