//! Registry CLI command.

use crate::registry::CanonicalRegistry;
use serde::Serialize;

/// One canonical model as listed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Canonical id.
    pub id: String,
    /// Aliases, as configured.
    pub aliases: Vec<String>,
    /// Detection pattern source.
    pub pattern: String,
}

/// Registry command handler.
pub struct RegistryCommand;

impl RegistryCommand {
    /// Creates a new registry command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lists every canonical model in registry order.
    #[must_use]
    pub fn execute(&self, registry: &CanonicalRegistry) -> Vec<RegistryEntry> {
        registry
            .iter()
            .map(|model| RegistryEntry {
                id: model.id().to_string(),
                aliases: model.aliases().to_vec(),
                pattern: model.detection_pattern().as_str().to_string(),
            })
            .collect()
    }
}

impl Default for RegistryCommand {
    fn default() -> Self {
        Self::new()
    }
}
