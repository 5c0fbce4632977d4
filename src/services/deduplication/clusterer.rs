//! Greedy duplicate clustering.

use super::config::DeduplicationConfig;
use super::similarity::SimilarityMatrix;
use crate::Result;
use crate::embedding::Embedder;
use crate::models::{DuplicateAssignment, DuplicateReason, DuplicateStatus, ListingRecord};
use crate::normalize::UrlNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Groups listings that describe the same offer.
///
/// Titles are embedded and compared pairwise. Walking the batch in input
/// order, each unclaimed listing collects the unclaimed listings whose title
/// similarity clears the threshold and that are confirmed by one of, in order:
///
/// 1. equal canonical URLs,
/// 2. relative price difference within `price_epsilon` (relative to the
///    listing being scanned),
/// 3. the same seller (exact string equality), with the similarity bar
///    lowered by `seller_relaxation`.
///
/// A non-empty set forms a new group with the scanning listing as primary.
/// The result is deterministic for a fixed input order but depends on that
/// order.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use gpumatch::{DuplicateClusterer, DuplicateStatus, ListingRecord, TokenHashEmbedder};
///
/// let clusterer = DuplicateClusterer::new(Arc::new(TokenHashEmbedder::new()));
/// let listings = vec![
///     ListingRecord::new("NVIDIA RTX A6000 48GB").with_price(4500.0),
///     ListingRecord::new("NVIDIA RTX A6000 48GB Workstation").with_price(4600.0),
///     ListingRecord::new("AMD Radeon RX 7900 XTX").with_price(950.0),
/// ];
///
/// let assignments = clusterer.cluster(&listings)?;
/// assert_eq!(assignments[0].status, DuplicateStatus::DuplicatePrimary);
/// assert_eq!(assignments[1].status, DuplicateStatus::DuplicateSecondary);
/// assert_eq!(assignments[2].status, DuplicateStatus::Unique);
/// # Ok::<(), gpumatch::Error>(())
/// ```
pub struct DuplicateClusterer<E: Embedder + ?Sized = dyn Embedder> {
    embedder: Arc<E>,
    config: DeduplicationConfig,
    urls: UrlNormalizer,
}

impl<E: Embedder + ?Sized> DuplicateClusterer<E> {
    /// Creates a clusterer with the default configuration.
    #[must_use]
    pub fn new(embedder: Arc<E>) -> Self {
        let config = DeduplicationConfig::default();
        let urls = config.url_normalizer();
        Self {
            embedder,
            config,
            urls,
        }
    }

    /// Creates a clusterer with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if the configuration is invalid.
    pub fn with_config(embedder: Arc<E>, config: DeduplicationConfig) -> Result<Self> {
        config.validate()?;
        let urls = config.url_normalizer();
        Ok(Self {
            embedder,
            config,
            urls,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DeduplicationConfig {
        &self.config
    }

    /// Assigns a duplicate status to every listing, index-aligned with the
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error only when the embedder fails.
    #[instrument(skip(self, listings), fields(operation = "cluster", batch_size = listings.len()))]
    pub fn cluster(&self, listings: &[ListingRecord]) -> Result<Vec<DuplicateAssignment>> {
        let size = listings.len();
        if size == 0 {
            return Ok(Vec::new());
        }
        if size > self.config.warn_batch_size {
            tracing::warn!(
                batch_size = size,
                warn_batch_size = self.config.warn_batch_size,
                "Large batch: similarity matrix grows quadratically"
            );
        }

        let start = Instant::now();
        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        let matrix = SimilarityMatrix::build(self.embedder.as_ref(), &titles)?;
        let urls: Vec<String> = listings
            .iter()
            .map(|l| self.urls.normalize(l.url.as_deref()))
            .collect();

        let mut claimed = vec![false; size];
        let mut assignments = vec![DuplicateAssignment::unique(); size];
        let mut next_group: u32 = 1;

        for i in 0..size {
            if claimed[i] {
                continue;
            }

            let duplicates: Vec<(usize, DuplicateReason, f32)> = matrix
                .candidates(i, self.config.similarity_threshold)
                .filter(|&(j, _)| !claimed[j])
                .filter_map(|(j, sim)| {
                    self.confirm(&listings[i], &listings[j], &urls[i], &urls[j], sim)
                        .map(|reason| (j, reason, sim))
                })
                .collect();

            if duplicates.is_empty() {
                continue;
            }

            let group_id = next_group;
            next_group += 1;
            claimed[i] = true;
            assignments[i] = DuplicateAssignment::primary(group_id);

            for (j, reason, sim) in duplicates {
                tracing::debug!(
                    group_id,
                    primary = i,
                    secondary = j,
                    similarity = sim,
                    reason = %reason,
                    "Duplicate confirmed"
                );
                metrics::counter!("dedup_duplicates_total", "reason" => reason.to_string())
                    .increment(1);
                claimed[j] = true;
                assignments[j] = DuplicateAssignment::secondary(group_id, reason, sim);
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::counter!("dedup_batches_total").increment(1);
        metrics::histogram!("dedup_cluster_duration_ms").record(duration_ms);
        tracing::info!(
            batch_size = size,
            groups = next_group - 1,
            duplicates = claimed.iter().filter(|c| **c).count(),
            duration_ms,
            "Clustered listing batch"
        );

        Ok(assignments)
    }

    /// First criterion confirming `candidate` as a duplicate of `scanning`.
    fn confirm(
        &self,
        scanning: &ListingRecord,
        candidate: &ListingRecord,
        scanning_url: &str,
        candidate_url: &str,
        similarity: f32,
    ) -> Option<DuplicateReason> {
        if !scanning_url.is_empty() && scanning_url == candidate_url {
            return Some(DuplicateReason::Url);
        }

        if let (Some(p_i), Some(p_j)) = (scanning.usable_price(), candidate.usable_price())
            && p_i > 0.0
            && (p_i - p_j).abs() / p_i <= self.config.price_epsilon
        {
            return Some(DuplicateReason::Price);
        }

        if let (Some(s_i), Some(s_j)) = (scanning.usable_seller(), candidate.usable_seller())
            && s_i == s_j
            && similarity >= self.config.seller_threshold()
        {
            return Some(DuplicateReason::Seller);
        }

        None
    }
}

impl<E: Embedder + ?Sized> std::fmt::Debug for DuplicateClusterer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateClusterer")
            .field("dimensions", &self.embedder.dimensions())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One duplicate group, by listing index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Group id shared by the members.
    pub group_id: u32,
    /// Index of the primary listing.
    pub primary: usize,
    /// Indices of the secondary listings, ascending.
    pub secondaries: Vec<usize>,
}

/// Summarizes assignments into groups ordered by group id.
///
/// Assignments with a group id but no primary are dropped.
#[must_use]
pub fn cluster_groups(assignments: &[DuplicateAssignment]) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<u32, (Option<usize>, Vec<usize>)> = BTreeMap::new();
    for (index, assignment) in assignments.iter().enumerate() {
        let Some(group_id) = assignment.group_id else {
            continue;
        };
        let entry = groups.entry(group_id).or_default();
        match assignment.status {
            DuplicateStatus::DuplicatePrimary => entry.0 = Some(index),
            DuplicateStatus::DuplicateSecondary => entry.1.push(index),
            DuplicateStatus::Unique => {}
        }
    }

    groups
        .into_iter()
        .filter_map(|(group_id, (primary, secondaries))| {
            primary.map(|primary| DuplicateGroup {
                group_id,
                primary,
                secondaries,
            })
        })
        .collect()
}
