//! Matching and deduplication services.
//!
//! Services hold only immutable state and take batches of listing records in,
//! returning index-aligned results.

pub mod deduplication;
pub mod pipeline;
pub mod resolution;

pub use deduplication::{DeduplicationConfig, DuplicateClusterer, DuplicateGroup};
pub use pipeline::{ListingPipeline, ListingReport, PipelineSummary};
pub use resolution::{MatchCascade, ResolutionConfig};
