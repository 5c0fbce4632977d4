//! Process CLI command.

use crate::Result;
use crate::embedding::Embedder;
use crate::models::ListingRecord;
use crate::services::deduplication::DuplicateGroup;
use crate::services::pipeline::{self, ListingPipeline, ListingReport, PipelineSummary};
use serde::Serialize;

/// Output of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutput {
    /// Batch counts.
    pub summary: PipelineSummary,
    /// Duplicate groups by listing index.
    pub groups: Vec<DuplicateGroup>,
    /// One report per listing, index-aligned.
    pub reports: Vec<ListingReport>,
}

/// Process command handler.
#[derive(Debug, Clone, Default)]
pub struct ProcessCommand {
    listings: Vec<ListingRecord>,
}

impl ProcessCommand {
    /// Creates a command over a batch of listings.
    #[must_use]
    pub const fn new(listings: Vec<ListingRecord>) -> Self {
        Self { listings }
    }

    /// Runs the pipeline over the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails.
    pub fn execute<E: Embedder + ?Sized>(
        &self,
        pipeline: &ListingPipeline<E>,
    ) -> Result<ProcessOutput> {
        let reports = pipeline.process(&self.listings)?;
        Ok(ProcessOutput {
            summary: PipelineSummary::from_reports(&reports),
            groups: pipeline::groups(&reports),
            reports,
        })
    }
}
