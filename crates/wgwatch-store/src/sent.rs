//! In-memory set of notified listing ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wgwatch_core::ListingId;

/// Ids of listings that were already notified.
///
/// Ids are only ever added. Serializes as a sorted JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentSet {
    ids: BTreeSet<ListingId>,
}

impl SentSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the id was already notified.
    #[must_use]
    pub fn contains(&self, id: &ListingId) -> bool {
        self.ids.contains(id)
    }

    /// Record an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: ListingId) -> bool {
        self.ids.insert(id)
    }

    /// Number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no id was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &ListingId> {
        self.ids.iter()
    }
}

impl FromIterator<ListingId> for SentSet {
    fn from_iter<I: IntoIterator<Item = ListingId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
