//! Passage representation: the nodes of the citation graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a passage
///
/// Passage ids are dense integers assigned in reading order, so an id range
/// around an anchor is its immediate textual neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassageId(i64);

impl PassageId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer value
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Shift the id by `delta`, saturating at the integer bounds
    pub fn offset(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for PassageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PassageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Alternate key of a passage: collection, chapter and item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub collection_code: String,
    pub chapter: i64,
    pub item: i64,
}

impl Reference {
    pub fn new(collection_code: impl Into<String>, chapter: i64, item: i64) -> Self {
        Self {
            collection_code: collection_code.into(),
            chapter,
            item,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.collection_code, self.chapter, self.item)
    }
}

/// Error returned when a reference string is not of the form `CODE CHAPTER:ITEM`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reference '{0}', expected CODE CHAPTER:ITEM")]
pub struct ParseReferenceError(String);

impl FromStr for Reference {
    type Err = ParseReferenceError;

    /// Parse the canonical `CODE CHAPTER:ITEM` form (e.g. `GEN 1:1`).
    ///
    /// This is a strict structural parse, not free-text anchor resolution.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseReferenceError(s.to_string());

        let (code, location) = s.trim().rsplit_once(' ').ok_or_else(invalid)?;
        let (chapter, item) = location.split_once(':').ok_or_else(invalid)?;

        let code = code.trim();
        if code.is_empty() {
            return Err(invalid());
        }
        let chapter = chapter.parse::<i64>().map_err(|_| invalid())?;
        let item = item.parse::<i64>().map_err(|_| invalid())?;

        Ok(Self::new(code.to_uppercase(), chapter, item))
    }
}

/// A passage: one node of the citation graph
///
/// Passages are read-only projections of the passage store. The traversal
/// engine never creates or mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    /// Short collection code, e.g. "GEN"
    pub collection_code: String,
    /// Display name of the collection, e.g. "Genesis"
    pub collection_name: String,
    pub chapter: i64,
    pub item: i64,
    pub text: String,
}

impl Passage {
    pub fn new(
        id: impl Into<PassageId>,
        collection_code: impl Into<String>,
        collection_name: impl Into<String>,
        chapter: i64,
        item: i64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            collection_code: collection_code.into(),
            collection_name: collection_name.into(),
            chapter,
            item,
            text: text.into(),
        }
    }

    /// The alternate key of this passage
    pub fn reference(&self) -> Reference {
        Reference::new(self.collection_code.clone(), self.chapter, self.item)
    }
}
