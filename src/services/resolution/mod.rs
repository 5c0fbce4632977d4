//! Canonical model resolution.
//!
//! Resolves free-text listing titles against the [`CanonicalRegistry`] through
//! an ordered cascade of stages:
//!
//! | Stage | Match | Confidence |
//! |-------|-------|------------|
//! | Exact | Normalized title equals an id or alias | `1.0` |
//! | Regex | A detection pattern is found in the raw title | `0.9` |
//! | Fuzzy | Best token-set/partial score clears the threshold | `0.8 * score / 100` |
//!
//! Titles no stage matches resolve to `UNKNOWN` with confidence `0.0`.
//!
//! [`CanonicalRegistry`]: crate::registry::CanonicalRegistry

mod cascade;
mod config;
pub mod fuzzy;
mod stages;

pub use cascade::MatchCascade;
pub use config::{
    DEFAULT_FOREIGN_VENDOR_TERMS, DEFAULT_FUZZY_THRESHOLD, DEFAULT_HOME_VENDOR_TERMS,
    ResolutionConfig,
};
pub use stages::{ExactStage, FuzzyOverride, FuzzyStage, MatchStage, RegexStage, StageMatch};
