//! End-to-end listing processing.
//!
//! Resolves every listing title and clusters the batch, producing one report
//! per listing.

use crate::Result;
use crate::embedding::Embedder;
use crate::models::{DuplicateAssignment, ListingRecord, MatchKind, ResolutionResult};
use crate::services::deduplication::{DuplicateClusterer, DuplicateGroup, cluster_groups};
use crate::services::resolution::MatchCascade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Resolution and duplicate status of one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingReport {
    /// Position in the input batch.
    pub index: usize,
    /// Title as received.
    pub title: String,
    /// Canonical model resolution.
    pub resolution: ResolutionResult,
    /// Duplicate clustering outcome.
    pub duplicate: DuplicateAssignment,
}

/// Batch-level counts over a set of reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of listings.
    pub total: usize,
    /// Listings resolved to a canonical model.
    pub resolved: usize,
    /// Listings left as `UNKNOWN`.
    pub unknown: usize,
    /// Resolutions per match kind.
    pub by_match_kind: BTreeMap<MatchKind, usize>,
    /// Number of duplicate groups.
    pub duplicate_groups: usize,
    /// Listings marked as secondary duplicates.
    pub duplicates: usize,
}

impl PipelineSummary {
    /// Summarizes a batch of reports.
    #[must_use]
    pub fn from_reports(reports: &[ListingReport]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            if report.resolution.is_resolved() {
                summary.resolved += 1;
            } else {
                summary.unknown += 1;
            }
            *summary
                .by_match_kind
                .entry(report.resolution.match_kind)
                .or_insert(0) += 1;
            if report.duplicate.status == crate::models::DuplicateStatus::DuplicateSecondary {
                summary.duplicates += 1;
            }
        }
        summary.duplicate_groups = groups(reports).len();
        summary
    }
}

/// Duplicate groups present in a batch of reports.
#[must_use]
pub fn groups(reports: &[ListingReport]) -> Vec<DuplicateGroup> {
    let assignments: Vec<DuplicateAssignment> =
        reports.iter().map(|r| r.duplicate.clone()).collect();
    cluster_groups(&assignments)
}

/// Runs the match cascade and the duplicate clusterer over listing batches.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use gpumatch::{
///     CanonicalRegistry, DuplicateClusterer, ListingPipeline, ListingRecord, MatchCascade,
///     TokenHashEmbedder,
/// };
///
/// let cascade = MatchCascade::new(Arc::new(CanonicalRegistry::with_defaults()?));
/// let clusterer = DuplicateClusterer::new(Arc::new(TokenHashEmbedder::new()));
/// let pipeline = ListingPipeline::new(cascade, clusterer);
///
/// let reports = pipeline.process(&[
///     ListingRecord::new("NVIDIA RTX A6000 48GB").with_price(4500.0),
///     ListingRecord::new("NVIDIA RTX A6000 48GB Workstation").with_price(4600.0),
/// ])?;
///
/// assert_eq!(reports[0].resolution.model_id, "RTX_A6000");
/// assert_eq!(reports[0].duplicate.group_id, reports[1].duplicate.group_id);
/// # Ok::<(), gpumatch::Error>(())
/// ```
pub struct ListingPipeline<E: Embedder + ?Sized = dyn Embedder> {
    cascade: MatchCascade,
    clusterer: DuplicateClusterer<E>,
}

impl<E: Embedder + ?Sized> ListingPipeline<E> {
    /// Creates a pipeline from its two engines.
    #[must_use]
    pub const fn new(cascade: MatchCascade, clusterer: DuplicateClusterer<E>) -> Self {
        Self { cascade, clusterer }
    }

    /// The match cascade.
    #[must_use]
    pub const fn cascade(&self) -> &MatchCascade {
        &self.cascade
    }

    /// The duplicate clusterer.
    #[must_use]
    pub const fn clusterer(&self) -> &DuplicateClusterer<E> {
        &self.clusterer
    }

    /// Resolves and clusters a batch, index-aligned with the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails.
    #[instrument(skip(self, listings), fields(operation = "process", batch_size = listings.len()))]
    pub fn process(&self, listings: &[ListingRecord]) -> Result<Vec<ListingReport>> {
        let duplicates = self.clusterer.cluster(listings)?;

        let reports: Vec<ListingReport> = listings
            .iter()
            .zip(duplicates)
            .enumerate()
            .map(|(index, (listing, duplicate))| ListingReport {
                index,
                title: listing.title.clone(),
                resolution: self.cascade.resolve(&listing.title),
                duplicate,
            })
            .collect();

        let summary = PipelineSummary::from_reports(&reports);
        tracing::info!(
            total = summary.total,
            resolved = summary.resolved,
            unknown = summary.unknown,
            duplicate_groups = summary.duplicate_groups,
            "Processed listing batch"
        );

        Ok(reports)
    }
}

impl<E: Embedder + ?Sized> std::fmt::Debug for ListingPipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingPipeline")
            .field("cascade", &self.cascade)
            .field("clusterer", &self.clusterer)
            .finish()
    }
}
