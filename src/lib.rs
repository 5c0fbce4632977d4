//! # gpumatch
//!
//! Canonical model resolution and duplicate clustering for GPU marketplace
//! listings.
//!
//! Listing titles scraped from heterogeneous sources are noisy. This crate
//! provides the two engines that sit between scraping and pricing:
//!
//! - A [`MatchCascade`] that resolves a title to a canonical model id
//!   (exact, regex, then fuzzy matching against a [`CanonicalRegistry`]).
//! - A [`DuplicateClusterer`] that groups listings describing the same offer,
//!   combining title-embedding similarity with URL, price and seller signals.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gpumatch::{CanonicalRegistry, MatchCascade, MatchKind};
//!
//! let registry = Arc::new(CanonicalRegistry::with_defaults()?);
//! let cascade = MatchCascade::new(registry);
//!
//! let result = cascade.resolve("rtx a6000");
//! assert_eq!(result.model_id, "RTX_A6000");
//! assert_eq!(result.match_kind, MatchKind::Exact);
//! # Ok::<(), gpumatch::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod embedding;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod registry;
pub mod services;

pub use config::GpuMatchConfig;
pub use embedding::{Embedder, FastEmbedEmbedder, TokenHashEmbedder};
pub use models::{
    DuplicateAssignment, DuplicateStatus, ListingRecord, MatchKind, ResolutionResult,
    UNKNOWN_MODEL_ID,
};
pub use normalize::{UrlNormalizer, normalize_title};
pub use registry::{CanonicalModel, CanonicalRegistry};
pub use services::{
    DeduplicationConfig, DuplicateClusterer, ListingPipeline, ListingReport, MatchCascade,
    ResolutionConfig,
};

/// Error type for gpumatch operations.
///
/// Per-record gaps (empty titles, missing prices, URLs or sellers) are never
/// errors; they are handled by the engines as "no signal".
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed batch input handed to the CLI or an embedder |
/// | `InvalidRegistry` | Registry load finds a bad regex, missing pattern or reserved id |
/// | `OperationFailed` | File I/O, JSON/TOML parsing, embedding model failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The canonical registry could not be built.
    ///
    /// Raised at load time, before any batch is processed:
    /// - A detection pattern does not compile
    /// - A canonical id has no detection pattern, or a pattern names an unknown id
    /// - The reserved `UNKNOWN` id is used
    /// - The registry is empty
    #[error("invalid registry entry '{id}': {reason}")]
    InvalidRegistry {
        /// The canonical id (or document path) at fault.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for gpumatch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("missing title column".to_string());
        assert_eq!(err.to_string(), "invalid input: missing title column");

        let err = Error::OperationFailed {
            operation: "read_registry".to_string(),
            cause: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'read_registry' failed: not found");

        let err = Error::InvalidRegistry {
            id: "H100".to_string(),
            reason: "no detection pattern".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid registry entry 'H100': no detection pattern"
        );
    }
}
