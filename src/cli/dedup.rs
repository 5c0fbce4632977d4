//! Dedup CLI command.

use crate::Result;
use crate::embedding::Embedder;
use crate::models::{DuplicateAssignment, ListingRecord};
use crate::services::DuplicateClusterer;
use serde::Serialize;

/// Duplicate assignment of the listing at `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedAssignment {
    /// Position in the input batch.
    pub index: usize,
    /// Clustering outcome.
    #[serde(flatten)]
    pub assignment: DuplicateAssignment,
}

/// Dedup command handler.
#[derive(Debug, Clone, Default)]
pub struct DedupCommand {
    listings: Vec<ListingRecord>,
}

impl DedupCommand {
    /// Creates a command over a batch of listings.
    #[must_use]
    pub const fn new(listings: Vec<ListingRecord>) -> Self {
        Self { listings }
    }

    /// Clusters the batch, returning one assignment per listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails.
    pub fn execute<E: Embedder + ?Sized>(
        &self,
        clusterer: &DuplicateClusterer<E>,
    ) -> Result<Vec<IndexedAssignment>> {
        Ok(clusterer
            .cluster(&self.listings)?
            .into_iter()
            .enumerate()
            .map(|(index, assignment)| IndexedAssignment { index, assignment })
            .collect())
    }
}
