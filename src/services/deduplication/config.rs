//! Deduplication configuration.
//!
//! Thresholds for the similarity gate and the confirmation criteria, plus the
//! marketplace domains used for URL canonicalization.

use crate::config::parse_env;
use crate::normalize::UrlNormalizer;
use crate::{Error, Result};

/// Configuration for the duplicate clusterer.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `GPUMATCH_SIMILARITY_THRESHOLD` | f32 | `0.85` | Minimum title cosine similarity |
/// | `GPUMATCH_PRICE_EPSILON` | f64 | `0.05` | Maximum relative price difference |
/// | `GPUMATCH_SELLER_RELAXATION` | f32 | `0.05` | Similarity slack for same-seller pairs |
/// | `GPUMATCH_WARN_BATCH_SIZE` | usize | `5000` | Batch size that triggers a warning |
///
/// # Example
///
/// ```rust
/// use gpumatch::DeduplicationConfig;
///
/// let config = DeduplicationConfig::default();
/// assert_eq!(config.similarity_threshold, 0.85);
/// assert_eq!(config.price_epsilon, 0.05);
/// assert!((config.seller_threshold() - 0.80).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeduplicationConfig {
    /// Minimum cosine similarity for two titles to be duplicate candidates.
    pub similarity_threshold: f32,

    /// Maximum relative price difference `|p_i - p_j| / p_i`.
    pub price_epsilon: f64,

    /// How far below `similarity_threshold` a same-seller pair may score.
    ///
    /// Candidates already clear `similarity_threshold`, so with the default
    /// this check never rejects a candidate; it matters once the relaxation
    /// is negative (a stricter same-seller bar).
    pub seller_relaxation: f32,

    /// Batches larger than this are logged at `warn`. Never refused.
    pub warn_batch_size: usize,

    /// Host substrings treated as `itm`-style marketplaces.
    pub marketplace_domains: Vec<String>,
}

impl DeduplicationConfig {
    /// Creates the default configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if an override cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the variable whose value cannot
    /// be parsed.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_env(&lookup, "GPUMATCH_SIMILARITY_THRESHOLD")? {
            self.similarity_threshold = v;
        }
        if let Some(v) = parse_env(&lookup, "GPUMATCH_PRICE_EPSILON")? {
            self.price_epsilon = v;
        }
        if let Some(v) = parse_env(&lookup, "GPUMATCH_SELLER_RELAXATION")? {
            self.seller_relaxation = v;
        }
        if let Some(v) = parse_env(&lookup, "GPUMATCH_WARN_BATCH_SIZE")? {
            self.warn_batch_size = v;
        }
        Ok(self)
    }

    /// Similarity a same-seller candidate must reach.
    #[must_use]
    pub fn seller_threshold(&self) -> f32 {
        self.similarity_threshold - self.seller_relaxation
    }

    /// Builds the URL normalizer for the configured marketplaces.
    #[must_use]
    pub fn url_normalizer(&self) -> UrlNormalizer {
        UrlNormalizer::from_domains(&self.marketplace_domains)
    }

    /// Builder method to set the similarity threshold.
    #[must_use]
    pub const fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Builder method to set the price tolerance.
    #[must_use]
    pub const fn with_price_epsilon(mut self, epsilon: f64) -> Self {
        self.price_epsilon = epsilon;
        self
    }

    /// Builder method to set the same-seller similarity slack.
    #[must_use]
    pub const fn with_seller_relaxation(mut self, relaxation: f32) -> Self {
        self.seller_relaxation = relaxation;
        self
    }

    /// Builder method to set the warning batch size.
    #[must_use]
    pub const fn with_warn_batch_size(mut self, size: usize) -> Self {
        self.warn_batch_size = size;
        self
    }

    /// Builder method to set the marketplace domains.
    #[must_use]
    pub fn with_marketplace_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.marketplace_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that thresholds are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.similarity_threshold.is_finite() || !(-1.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(Error::InvalidInput(format!(
                "similarity_threshold must be in [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !self.price_epsilon.is_finite() || self.price_epsilon < 0.0 {
            return Err(Error::InvalidInput(format!(
                "price_epsilon must be a non-negative number, got {}",
                self.price_epsilon
            )));
        }
        if !self.seller_relaxation.is_finite() {
            return Err(Error::InvalidInput(format!(
                "seller_relaxation must be finite, got {}",
                self.seller_relaxation
            )));
        }
        Ok(())
    }
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            price_epsilon: 0.05,
            seller_relaxation: 0.05,
            warn_batch_size: 5000,
            marketplace_domains: vec!["ebay.".to_string()],
        }
    }
}
