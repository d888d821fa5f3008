//! Layer fetching and passage hydration
//!
//! These two leaves are shared by both builders. Neither one raises on a
//! store failure: a failed read is logged and treated as "nothing found",
//! so the caller keeps whatever it has accumulated so far.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::graph::{Passage, PassageId};
use crate::storage::{EdgeStore, PassageStore, StorageResult};

/// A ranked citation target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHit {
    pub id: PassageId,
    /// Number of retrieved edges pointing at this target, repeats included
    pub count: usize,
    /// First source seen citing this target
    pub via: PassageId,
}

/// Rank the outgoing citation targets of `source_ids` by how many sources cite them.
///
/// Targets in `exclude` are skipped. Every retrieved edge counts, so a
/// source citing a target twice adds two. Ties keep first-seen order. At
/// most `limit` hits are returned.
pub async fn fetch_ranked_layer<S>(
    store: &S,
    source_ids: &[PassageId],
    limit: usize,
    exclude: &HashSet<PassageId>,
) -> Vec<LayerHit>
where
    S: EdgeStore + ?Sized,
{
    if source_ids.is_empty() || limit == 0 {
        return Vec::new();
    }

    let edges = match store.get_outgoing(source_ids).await {
        Ok(edges) => edges,
        Err(e) => {
            warn!(error = %e, sources = source_ids.len(), "edge read failed; treating layer as empty");
            return Vec::new();
        }
    };

    let mut hits: Vec<LayerHit> = Vec::new();
    let mut position: HashMap<PassageId, usize> = HashMap::new();

    for edge in edges {
        if exclude.contains(&edge.to) {
            continue;
        }
        match position.get(&edge.to) {
            Some(&i) => hits[i].count += 1,
            None => {
                position.insert(edge.to, hits.len());
                hits.push(LayerHit {
                    id: edge.to,
                    count: 1,
                    via: edge.from,
                });
            }
        }
    }

    // Stable: equal counts stay in first-seen order
    hits.sort_by(|a, b| b.count.cmp(&a.count));
    hits.truncate(limit);
    hits
}

/// Ids of the top `limit` citation targets of `source_ids`, most cited first
pub async fn fetch_layer<S>(
    store: &S,
    source_ids: &[PassageId],
    limit: usize,
    exclude: &HashSet<PassageId>,
) -> Vec<PassageId>
where
    S: EdgeStore + ?Sized,
{
    fetch_ranked_layer(store, source_ids, limit, exclude)
        .await
        .into_iter()
        .map(|hit| hit.id)
        .collect()
}

/// Load passages for `ids`, in the order given.
///
/// Ids the store does not return are dropped; a failed read yields nothing.
pub async fn hydrate<S>(store: &S, ids: &[PassageId]) -> Vec<Passage>
where
    S: PassageStore + ?Sized,
{
    match try_hydrate(store, ids).await {
        Ok(passages) => passages,
        Err(e) => {
            warn!(error = %e, requested = ids.len(), "passage read failed; continuing without them");
            Vec::new()
        }
    }
}

/// Like [`hydrate`], but surfaces the store error
pub async fn try_hydrate<S>(store: &S, ids: &[PassageId]) -> StorageResult<Vec<Passage>>
where
    S: PassageStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_id: HashMap<PassageId, Passage> = store
        .get_by_ids(ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}
