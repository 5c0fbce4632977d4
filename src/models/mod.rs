//! Data models for gpumatch.
//!
//! Input records, resolution results and duplicate assignments shared by the
//! engines and the CLI.

mod duplicate;
mod listing;
mod resolution;

pub use duplicate::{DuplicateAssignment, DuplicateReason, DuplicateStatus};
pub use listing::ListingRecord;
pub use resolution::{MatchKind, ResolutionResult, UNKNOWN_MODEL_ID};
