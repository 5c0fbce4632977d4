//! The match cascade.

use super::config::ResolutionConfig;
use super::stages::{ExactStage, FuzzyStage, MatchStage, RegexStage};
use crate::models::ResolutionResult;
use crate::normalize::normalize_title;
use crate::registry::CanonicalRegistry;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Resolves listing titles to canonical model ids.
///
/// Stages run in order (exact, regex, fuzzy) and the first hit wins. The
/// cascade holds only immutable state and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use gpumatch::{CanonicalRegistry, MatchCascade, MatchKind};
///
/// let cascade = MatchCascade::new(Arc::new(CanonicalRegistry::with_defaults()?));
///
/// let exact = cascade.resolve("Tesla T4");
/// assert_eq!(exact.match_kind, MatchKind::Exact);
///
/// let regex = cascade.resolve("PNY NVIDIA H100 PCIe 80GB");
/// assert_eq!(regex.model_id, "H100");
/// assert_eq!(regex.match_kind, MatchKind::Regex);
///
/// let unknown = cascade.resolve("Intel Arc A310 4GB");
/// assert_eq!(unknown.model_id, "UNKNOWN");
/// # Ok::<(), gpumatch::Error>(())
/// ```
pub struct MatchCascade {
    registry: Arc<CanonicalRegistry>,
    stages: Vec<Box<dyn MatchStage>>,
}

impl MatchCascade {
    /// Creates the standard cascade with the default configuration.
    #[must_use]
    pub fn new(registry: Arc<CanonicalRegistry>) -> Self {
        Self::build(registry, &ResolutionConfig::default())
    }

    /// Creates the standard cascade with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if the configuration is invalid.
    pub fn with_config(registry: Arc<CanonicalRegistry>, config: &ResolutionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(registry, config))
    }

    /// Creates a cascade running the given stages in order.
    #[must_use]
    pub fn from_stages(registry: Arc<CanonicalRegistry>, stages: Vec<Box<dyn MatchStage>>) -> Self {
        Self { registry, stages }
    }

    fn build(registry: Arc<CanonicalRegistry>, config: &ResolutionConfig) -> Self {
        let stages: Vec<Box<dyn MatchStage>> = vec![
            Box::new(ExactStage::new(Arc::clone(&registry))),
            Box::new(RegexStage::new(Arc::clone(&registry))),
            Box::new(FuzzyStage::new(Arc::clone(&registry), config)),
        ];
        Self { registry, stages }
    }

    /// The registry the cascade matches against.
    #[must_use]
    pub fn registry(&self) -> &CanonicalRegistry {
        &self.registry
    }

    /// Resolves one title. Never fails; unmatched titles resolve to
    /// [`ResolutionResult::unresolved`].
    #[instrument(skip(self, title), fields(operation = "resolve", title_len = title.len()))]
    pub fn resolve(&self, title: &str) -> ResolutionResult {
        let start = Instant::now();
        let normalized = normalize_title(title);

        let result = self
            .stages
            .iter()
            .find_map(|stage| {
                stage
                    .attempt(&normalized, title)
                    .map(|hit| hit.into_result(stage.kind()))
            })
            .unwrap_or_else(ResolutionResult::unresolved);

        tracing::debug!(
            model_id = %result.model_id,
            match_kind = %result.match_kind,
            confidence = result.confidence,
            "title resolved"
        );
        metrics::counter!("resolution_total", "match_kind" => result.match_kind.as_str())
            .increment(1);
        metrics::histogram!("resolution_duration_us")
            .record(start.elapsed().as_secs_f64() * 1_000_000.0);

        result
    }

    /// Resolves each title, index-aligned with the input.
    pub fn resolve_batch<S: AsRef<str>>(&self, titles: &[S]) -> Vec<ResolutionResult> {
        titles.iter().map(|t| self.resolve(t.as_ref())).collect()
    }
}

impl std::fmt::Debug for MatchCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCascade")
            .field("models", &self.registry.len())
            .field(
                "stages",
                &self.stages.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
