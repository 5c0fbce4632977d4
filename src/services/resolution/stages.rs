//! Cascade stages.
//!
//! Each stage looks at a title independently; the cascade runs them in order
//! and stops at the first hit.

use super::config::ResolutionConfig;
use super::fuzzy::{partial_ratio, token_set_ratio};
use crate::models::{MatchKind, ResolutionResult};
use crate::normalize::title_tokens;
use crate::registry::{A2000_12GB_ID, CanonicalModel, CanonicalRegistry};
use std::sync::Arc;

/// A stage hit: the matched canonical id and its stage-specific score.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMatch {
    /// Matched canonical id.
    pub model_id: String,
    /// Fuzzy score on the 0-100 scale; 100 for exact and regex hits.
    pub score: f64,
}

impl StageMatch {
    fn certain(model: &CanonicalModel) -> Self {
        Self {
            model_id: model.id().to_string(),
            score: 100.0,
        }
    }

    /// Converts the hit into a result in the confidence band of `kind`.
    #[must_use]
    pub fn into_result(self, kind: MatchKind) -> ResolutionResult {
        match kind {
            MatchKind::Exact => ResolutionResult::exact(self.model_id),
            MatchKind::Regex => ResolutionResult::regex(self.model_id),
            MatchKind::Fuzzy => ResolutionResult::fuzzy(self.model_id, self.score),
            MatchKind::None => ResolutionResult::unresolved(),
        }
    }
}

/// One step of the match cascade.
pub trait MatchStage: Send + Sync {
    /// The kind of match this stage produces.
    fn kind(&self) -> MatchKind;

    /// Tries to match a title.
    ///
    /// `normalized` is the trimmed, lower-cased title; `raw` is the title as
    /// received.
    fn attempt(&self, normalized: &str, raw: &str) -> Option<StageMatch>;
}

/// Full-string equality against lower-cased ids and aliases.
#[derive(Debug, Clone)]
pub struct ExactStage {
    registry: Arc<CanonicalRegistry>,
}

impl ExactStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new(registry: Arc<CanonicalRegistry>) -> Self {
        Self { registry }
    }
}

impl MatchStage for ExactStage {
    fn kind(&self) -> MatchKind {
        MatchKind::Exact
    }

    fn attempt(&self, normalized: &str, _raw: &str) -> Option<StageMatch> {
        if normalized.is_empty() {
            return None;
        }
        self.registry
            .iter()
            .find(|model| model.match_targets().any(|target| target == normalized))
            .map(StageMatch::certain)
    }
}

/// Detection-pattern search over the raw title.
#[derive(Debug, Clone)]
pub struct RegexStage {
    registry: Arc<CanonicalRegistry>,
}

impl RegexStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new(registry: Arc<CanonicalRegistry>) -> Self {
        Self { registry }
    }
}

impl MatchStage for RegexStage {
    fn kind(&self) -> MatchKind {
        MatchKind::Regex
    }

    fn attempt(&self, _normalized: &str, raw: &str) -> Option<StageMatch> {
        self.registry
            .iter()
            .find(|model| model.detection_pattern().is_match(raw))
            .map(StageMatch::certain)
    }
}

/// A fuzzy-stage rule that scores a single entry first.
///
/// When the normalized title contains any trigger, only `model_id` is scored,
/// and a score at or above the threshold is returned without looking at other
/// entries. Used where short aliases of a different model would otherwise
/// win on partial overlap (`a2` inside `a2000`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyOverride {
    /// Canonical id scored ahead of the general search.
    pub model_id: String,
    /// Lower-cased substrings that activate the rule.
    pub triggers: Vec<String>,
}

impl FuzzyOverride {
    /// Creates an override.
    #[must_use]
    pub fn new<I, S>(model_id: impl Into<String>, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model_id: model_id.into(),
            triggers: triggers
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
        }
    }

    /// The 12GB A2000 rule.
    #[must_use]
    pub fn a2000_12gb() -> Self {
        Self::new(A2000_12GB_ID, ["a2000", "a 2000"])
    }

    fn applies_to(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }
}

/// Token-set and partial-ratio similarity against every id and alias.
#[derive(Debug, Clone)]
pub struct FuzzyStage {
    registry: Arc<CanonicalRegistry>,
    threshold: f64,
    foreign_vendor_terms: Vec<String>,
    home_vendor_terms: Vec<String>,
    overrides: Vec<FuzzyOverride>,
}

impl FuzzyStage {
    /// Creates the stage with the A2000 override.
    #[must_use]
    pub fn new(registry: Arc<CanonicalRegistry>, config: &ResolutionConfig) -> Self {
        Self {
            registry,
            threshold: config.fuzzy_threshold,
            foreign_vendor_terms: config.foreign_vendor_terms.clone(),
            home_vendor_terms: config.home_vendor_terms.clone(),
            overrides: vec![FuzzyOverride::a2000_12gb()],
        }
    }

    /// Replaces the override rules.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Vec<FuzzyOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Minimum accepted score.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best score of `normalized` against the entry's id and aliases.
    #[must_use]
    pub fn entry_score(model: &CanonicalModel, normalized: &str) -> f64 {
        model
            .match_targets()
            .map(|target| token_set_ratio(normalized, target).max(partial_ratio(normalized, target)))
            .fold(0.0, f64::max)
    }

    /// Whether the title names another vendor and not the registry's own.
    fn is_foreign(&self, normalized: &str) -> bool {
        let mut foreign = false;
        for token in title_tokens(normalized) {
            if self.home_vendor_terms.iter().any(|t| t == token) {
                return false;
            }
            foreign |= self.foreign_vendor_terms.iter().any(|t| t == token);
        }
        foreign
    }

    fn try_overrides(&self, normalized: &str) -> Option<StageMatch> {
        self.overrides
            .iter()
            .filter(|rule| rule.applies_to(normalized))
            .filter_map(|rule| self.registry.get(&rule.model_id))
            .map(|model| StageMatch {
                model_id: model.id().to_string(),
                score: Self::entry_score(model, normalized),
            })
            .find(|hit| hit.score >= self.threshold)
    }
}

impl MatchStage for FuzzyStage {
    fn kind(&self) -> MatchKind {
        MatchKind::Fuzzy
    }

    fn attempt(&self, normalized: &str, _raw: &str) -> Option<StageMatch> {
        if normalized.is_empty() {
            return None;
        }
        if self.is_foreign(normalized) {
            tracing::debug!("title names a foreign vendor, skipping fuzzy match");
            return None;
        }
        if let Some(hit) = self.try_overrides(normalized) {
            return Some(hit);
        }

        let mut best: Option<(&CanonicalModel, f64)> = None;
        for model in self.registry.iter() {
            let score = Self::entry_score(model, normalized);
            // Strict comparison keeps the earliest entry on ties.
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((model, score));
            }
        }

        let (model, score) = best?;
        tracing::debug!(model_id = model.id(), score, "best fuzzy candidate");
        (score >= self.threshold).then(|| StageMatch {
            model_id: model.id().to_string(),
            score,
        })
    }
}
