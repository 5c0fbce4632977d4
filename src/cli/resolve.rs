//! Resolve CLI command.

use crate::models::ResolutionResult;
use crate::services::MatchCascade;
use serde::Serialize;

/// One resolved title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTitle {
    /// Title as given.
    pub title: String,
    /// Resolution outcome.
    #[serde(flatten)]
    pub resolution: ResolutionResult,
    /// Human-readable explanation of the outcome.
    pub reason: &'static str,
}

/// Resolve command handler.
#[derive(Debug, Clone, Default)]
pub struct ResolveCommand {
    titles: Vec<String>,
}

impl ResolveCommand {
    /// Creates a command for the given titles.
    #[must_use]
    pub const fn new(titles: Vec<String>) -> Self {
        Self { titles }
    }

    /// Resolves every title, in order.
    #[must_use]
    pub fn execute(&self, cascade: &MatchCascade) -> Vec<ResolvedTitle> {
        self.titles
            .iter()
            .zip(cascade.resolve_batch(&self.titles))
            .map(|(title, resolution)| ResolvedTitle {
                title: title.clone(),
                reason: resolution.reason(),
                resolution,
            })
            .collect()
    }
}
