//! Citation edges between passages

use super::passage::PassageId;
use serde::{Deserialize, Serialize};

/// A directed citation: `from` references `to`
///
/// Edges carry no weight in storage. The store may hold duplicates; consumers
/// deduplicate where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossRef {
    pub from: PassageId,
    pub to: PassageId,
}

impl CrossRef {
    pub fn new(from: impl Into<PassageId>, to: impl Into<PassageId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
