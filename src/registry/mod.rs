//! Canonical model registry.
//!
//! The registry is an ordered, immutable table of canonical GPU models. It is
//! built once (from the built-in tables or from JSON documents) and shared by
//! the engines through an `Arc`. Every problem with the input fails the load;
//! nothing is skipped silently.
//!
//! # JSON documents
//!
//! Aliases and detection patterns live in two separate documents keyed by the
//! same ids:
//!
//! ```json
//! { "H100": ["h100", "h100 sxm"], "T4": ["t4", "tesla t4"] }
//! ```
//!
//! ```json
//! { "H100": "\\bh100\\b", "T4": "\\bt4\\b" }
//! ```
//!
//! Document order is registry order.

mod defaults;

pub use defaults::{A2000_12GB_ID, DEFAULT_ALIASES, DEFAULT_PATTERNS};

use crate::models::UNKNOWN_MODEL_ID;
use crate::normalize::normalize_title;
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::instrument;

/// One canonical GPU model.
#[derive(Debug, Clone)]
pub struct CanonicalModel {
    id: String,
    aliases: Vec<String>,
    detection_pattern: Regex,
    normalized_id: String,
    normalized_aliases: Vec<String>,
}

impl CanonicalModel {
    /// Canonical id, e.g. `RTX_A6000`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Aliases as supplied, in order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Case-insensitive detection pattern.
    #[must_use]
    pub const fn detection_pattern(&self) -> &Regex {
        &self.detection_pattern
    }

    /// Lower-cased id.
    #[must_use]
    pub fn normalized_id(&self) -> &str {
        &self.normalized_id
    }

    /// Lower-cased aliases, index-aligned with [`Self::aliases`].
    #[must_use]
    pub fn normalized_aliases(&self) -> &[String] {
        &self.normalized_aliases
    }

    /// The normalized id followed by every normalized alias.
    pub fn match_targets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.normalized_id.as_str())
            .chain(self.normalized_aliases.iter().map(String::as_str))
    }
}

/// Ordered table of canonical models.
///
/// # Example
///
/// ```rust
/// use gpumatch::CanonicalRegistry;
///
/// let registry = CanonicalRegistry::from_tables(
///     vec![("H100".to_string(), vec!["h100 sxm".to_string()])],
///     vec![("H100".to_string(), r"\bh100\b".to_string())],
/// )?;
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.get("H100").is_some());
/// # Ok::<(), gpumatch::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CanonicalRegistry {
    models: Vec<CanonicalModel>,
}

impl CanonicalRegistry {
    /// Builds the built-in registry.
    pub fn with_defaults() -> Result<Self> {
        Self::from_tables(default_alias_table(), default_pattern_table())
    }

    /// Builds a registry from an ordered alias table and a pattern table.
    ///
    /// Every id needs exactly one pattern and every pattern needs a known id.
    #[instrument(skip_all, fields(operation = "registry_build"))]
    pub fn from_tables<A, P>(aliases: A, patterns: P) -> Result<Self>
    where
        A: IntoIterator<Item = (String, Vec<String>)>,
        P: IntoIterator<Item = (String, String)>,
    {
        let mut pattern_map: HashMap<String, String> = HashMap::new();
        for (id, pattern) in patterns {
            if pattern_map.insert(id.clone(), pattern).is_some() {
                return Err(invalid(&id, "detection pattern defined twice"));
            }
        }

        let mut models = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_aliases: HashMap<String, String> = HashMap::new();

        for (id, alias_list) in aliases {
            validate_id(&id)?;
            if !seen_ids.insert(id.clone()) {
                return Err(invalid(&id, "canonical id defined twice"));
            }

            let pattern = pattern_map
                .remove(&id)
                .ok_or_else(|| invalid(&id, "no detection pattern"))?;
            let detection_pattern = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| invalid(&id, &format!("invalid detection pattern: {e}")))?;

            let mut normalized_aliases = Vec::with_capacity(alias_list.len());
            for alias in &alias_list {
                let normalized = normalize_title(alias);
                if normalized.is_empty() {
                    return Err(invalid(&id, "blank alias"));
                }
                if let Some(owner) = seen_aliases.get(&normalized) {
                    tracing::warn!(
                        alias = %normalized,
                        first = %owner,
                        duplicate = %id,
                        "Alias defined for more than one model; registry order decides"
                    );
                } else {
                    seen_aliases.insert(normalized.clone(), id.clone());
                }
                normalized_aliases.push(normalized);
            }

            models.push(CanonicalModel {
                normalized_id: normalize_title(&id),
                id,
                aliases: alias_list,
                detection_pattern,
                normalized_aliases,
            });
        }

        if let Some(orphan) = pattern_map.keys().min() {
            return Err(invalid(orphan, "detection pattern for unknown id"));
        }
        if models.is_empty() {
            return Err(invalid("<registry>", "registry has no entries"));
        }

        tracing::debug!(entries = models.len(), "Canonical registry built");
        Ok(Self { models })
    }

    /// Builds a registry from JSON documents.
    ///
    /// When `patterns_json` is `None`, patterns come from the built-in table and
    /// every id in `aliases_json` must have a built-in pattern.
    pub fn from_json_str(aliases_json: &str, patterns_json: Option<&str>) -> Result<Self> {
        let aliases = parse_alias_document(aliases_json)?;
        let patterns = match patterns_json {
            Some(doc) => parse_pattern_document(doc)?,
            None => defaults_for(&aliases),
        };
        Self::from_tables(aliases, patterns)
    }

    /// Loads a registry, falling back to the built-in tables for any document
    /// not supplied.
    #[instrument(fields(operation = "registry_load"))]
    pub fn load(aliases_path: Option<&Path>, patterns_path: Option<&Path>) -> Result<Self> {
        let aliases = match aliases_path {
            Some(path) => parse_alias_document(&read_document(path)?)?,
            None => default_alias_table(),
        };
        let patterns = match patterns_path {
            Some(path) => parse_pattern_document(&read_document(path)?)?,
            None => defaults_for(&aliases),
        };
        let registry = Self::from_tables(aliases, patterns)?;
        tracing::info!(entries = registry.len(), "Canonical registry loaded");
        Ok(registry)
    }

    /// Looks up a model by canonical id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CanonicalModel> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Iterates models in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalModel> {
        self.models.iter()
    }

    /// Number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always `false` for a successfully built registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<'a> IntoIterator for &'a CanonicalRegistry {
    type Item = &'a CanonicalModel;
    type IntoIter = std::slice::Iter<'a, CanonicalModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn invalid(id: &str, reason: &str) -> Error {
    Error::InvalidRegistry {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(invalid(id, "blank canonical id"));
    }
    if id.trim().eq_ignore_ascii_case(UNKNOWN_MODEL_ID) {
        return Err(invalid(id, "reserved canonical id"));
    }
    Ok(())
}

fn default_alias_table() -> Vec<(String, Vec<String>)> {
    DEFAULT_ALIASES
        .iter()
        .map(|(id, aliases)| {
            (
                (*id).to_string(),
                aliases.iter().map(|a| (*a).to_string()).collect(),
            )
        })
        .collect()
}

fn default_pattern_table() -> Vec<(String, String)> {
    DEFAULT_PATTERNS
        .iter()
        .map(|(id, pattern)| ((*id).to_string(), (*pattern).to_string()))
        .collect()
}

/// Built-in patterns restricted to the ids present in `aliases`.
fn defaults_for(aliases: &[(String, Vec<String>)]) -> Vec<(String, String)> {
    default_pattern_table()
        .into_iter()
        .filter(|(id, _)| aliases.iter().any(|(alias_id, _)| alias_id == id))
        .collect()
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
        operation: "read_registry_document".to_string(),
        cause: format!("{}: {e}", path.display()),
    })
}

fn parse_object(doc: &str, what: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(doc).map_err(|e| Error::OperationFailed {
        operation: format!("parse_{what}_document"),
        cause: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid(
            &format!("<{what}>"),
            "document must be a JSON object",
        )),
    }
}

fn parse_alias_document(doc: &str) -> Result<Vec<(String, Vec<String>)>> {
    parse_object(doc, "aliases")?
        .into_iter()
        .map(|(id, value)| {
            let Value::Array(items) = value else {
                return Err(invalid(&id, "aliases must be an array of strings"));
            };
            let aliases = items
                .into_iter()
                .map(|item| match item {
                    Value::String(alias) => Ok(alias),
                    _ => Err(invalid(&id, "aliases must be an array of strings")),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((id, aliases))
        })
        .collect()
}

fn parse_pattern_document(doc: &str) -> Result<Vec<(String, String)>> {
    parse_object(doc, "patterns")?
        .into_iter()
        .map(|(id, value)| match value {
            Value::String(pattern) => Ok((id, pattern)),
            _ => Err(invalid(&id, "pattern must be a string")),
        })
        .collect()
}
