//! Storage backends for the citation graph
//!
//! The engine reads through the `PassageStore` and `EdgeStore` traits.
//! `SqliteStore` is the persistent implementation; `GraphSnapshot` is an
//! in-memory copy owned by the caller.

mod snapshot;
mod sqlite;
mod traits;

pub use snapshot::{GraphSnapshot, SnapshotHandle};
pub use sqlite::SqliteStore;
pub use traits::{EdgeStore, GraphStore, PassageStore, StorageError, StorageResult};
