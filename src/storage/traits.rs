//! Storage trait definitions
//!
//! The traversal engine reads the citation graph through two collaborator
//! contracts: a passage store and an edge store. Both are read-only from the
//! engine's point of view.

use crate::graph::{CrossRef, Passage, PassageId, Reference};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Read access to passage records
///
/// Implementations must be thread-safe (Send + Sync) so that concurrent
/// traversals can share one store handle.
#[async_trait]
pub trait PassageStore: Send + Sync {
    /// Load the passages with the given ids.
    ///
    /// Ids the store does not hold are absent from the result; the output
    /// length may be shorter than the input.
    async fn get_by_ids(&self, ids: &[PassageId]) -> StorageResult<Vec<Passage>>;

    /// Load all passages with `lo <= id <= hi`, ordered by id
    async fn get_by_range(&self, lo: PassageId, hi: PassageId) -> StorageResult<Vec<Passage>>;

    /// Resolve a `(collection, chapter, item)` reference to a passage id
    async fn get_by_reference(&self, reference: &Reference) -> StorageResult<Option<PassageId>>;
}

/// Read access to citation edges
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Load every edge whose source is in `source_ids`, in store order
    async fn get_outgoing(&self, source_ids: &[PassageId]) -> StorageResult<Vec<CrossRef>>;
}

/// A store that serves both passages and edges
pub trait GraphStore: PassageStore + EdgeStore {}

impl<T: PassageStore + EdgeStore> GraphStore for T {}
