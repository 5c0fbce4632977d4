//! Resolution result types.

use serde::{Deserialize, Serialize};

/// Sentinel model id for titles that could not be resolved.
pub const UNKNOWN_MODEL_ID: &str = "UNKNOWN";

/// Which cascade stage produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized title equals a canonical id or alias.
    Exact,
    /// A detection pattern matched somewhere in the title.
    Regex,
    /// Fuzzy similarity cleared the threshold.
    Fuzzy,
    /// No stage matched.
    None,
}

impl MatchKind {
    /// Returns the kind as a static label (used for metrics).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Regex => "regex",
            Self::Fuzzy => "fuzzy",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one listing title.
///
/// Confidence bands never overlap: exact is `1.0`, regex `0.9`, fuzzy lies in
/// `(0.0, 0.8]` and an unresolved title is `0.0`. Use the constructors to keep
/// those bands intact.
///
/// # Example
///
/// ```rust
/// use gpumatch::{MatchKind, ResolutionResult};
///
/// let result = ResolutionResult::fuzzy("H100", 85.0);
/// assert_eq!(result.match_kind, MatchKind::Fuzzy);
/// assert!((result.confidence - 0.68).abs() < 1e-9);
///
/// let unknown = ResolutionResult::unresolved();
/// assert!(!unknown.is_resolved());
/// assert_eq!(unknown.reason(), "could not match to any known model");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Canonical model id, or [`UNKNOWN_MODEL_ID`].
    pub model_id: String,
    /// Stage that produced the match.
    pub match_kind: MatchKind,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl ResolutionResult {
    /// Confidence of an exact match.
    pub const EXACT_CONFIDENCE: f64 = 1.0;
    /// Confidence of a regex match.
    pub const REGEX_CONFIDENCE: f64 = 0.9;
    /// Upper bound of the fuzzy band.
    pub const FUZZY_CEILING: f64 = 0.8;

    /// Exact match result.
    #[must_use]
    pub fn exact(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            match_kind: MatchKind::Exact,
            confidence: Self::EXACT_CONFIDENCE,
        }
    }

    /// Regex match result.
    #[must_use]
    pub fn regex(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            match_kind: MatchKind::Regex,
            confidence: Self::REGEX_CONFIDENCE,
        }
    }

    /// Fuzzy match result; `score` is on the 0-100 scale and rescaled into
    /// `(0.0, 0.8]`.
    #[must_use]
    pub fn fuzzy(model_id: impl Into<String>, score: f64) -> Self {
        Self {
            model_id: model_id.into(),
            match_kind: MatchKind::Fuzzy,
            confidence: Self::FUZZY_CEILING * (score.clamp(0.0, 100.0) / 100.0),
        }
    }

    /// Result for a title no stage could match.
    #[must_use]
    pub fn unresolved() -> Self {
        Self {
            model_id: UNKNOWN_MODEL_ID.to_string(),
            match_kind: MatchKind::None,
            confidence: 0.0,
        }
    }

    /// Whether a canonical model was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.match_kind != MatchKind::None
    }

    /// Human-readable explanation, suitable for routing to manual review.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self.match_kind {
            MatchKind::Exact => "title equals a known model name or alias",
            MatchKind::Regex => "title matches a model detection pattern",
            MatchKind::Fuzzy => "title is similar to a known model name or alias",
            MatchKind::None => "could not match to any known model",
        }
    }
}
