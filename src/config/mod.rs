//! Configuration management.
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! `GPUMATCH_*` environment variables, then command-line flags.

use crate::observability::{LogFormat, LoggingConfig, MetricsConfig};
use crate::services::{DeduplicationConfig, ResolutionConfig};
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration for gpumatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuMatchConfig {
    /// Optional aliases document replacing the built-in alias table.
    pub registry_path: Option<PathBuf>,
    /// Optional detection patterns document replacing the built-in patterns.
    pub patterns_path: Option<PathBuf>,
    /// Match cascade settings.
    pub resolution: ResolutionConfig,
    /// Duplicate clusterer settings.
    pub deduplication: DeduplicationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Metrics settings.
    pub metrics: MetricsConfig,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Aliases document path.
    pub registry_path: Option<String>,
    /// Detection patterns document path.
    pub patterns_path: Option<String>,
    /// Resolution section.
    pub resolution: Option<ConfigFileResolution>,
    /// Deduplication section.
    pub deduplication: Option<ConfigFileDeduplication>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Resolution section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileResolution {
    /// Fuzzy acceptance threshold on the 0-100 scale.
    pub fuzzy_threshold: Option<f64>,
    /// Tokens marking a non-NVIDIA title.
    pub foreign_vendor_terms: Option<Vec<String>>,
    /// Tokens marking an NVIDIA title.
    pub home_vendor_terms: Option<Vec<String>>,
}

/// Deduplication section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDeduplication {
    /// Cosine similarity threshold.
    pub similarity_threshold: Option<f32>,
    /// Relative price tolerance.
    pub price_epsilon: Option<f64>,
    /// Same-seller similarity slack.
    pub seller_relaxation: Option<f32>,
    /// Batch size that triggers a warning.
    pub warn_batch_size: Option<usize>,
    /// Marketplace host substrings.
    pub marketplace_domains: Option<Vec<String>>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileMetrics {
    /// Whether metrics are recorded.
    pub enabled: Option<bool>,
}

impl GpuMatchConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config document.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::from_config_file(file)
    }

    /// Default config file location: `<config_dir>/gpumatch/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("gpumatch").join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// Returns default configuration if there is no config file.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load_default() -> crate::Result<Self> {
        Self::load_if_present(Self::default_path().as_deref())
    }

    /// Loads `path` when it names an existing file, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_if_present(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Applies `GPUMATCH_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] naming the first variable whose
    /// value cannot be parsed.
    pub fn apply_env_overrides(self) -> crate::Result<Self> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies `GPUMATCH_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] naming the first variable whose
    /// value cannot be parsed.
    pub fn apply_env_overrides_from<F>(mut self, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("GPUMATCH_REGISTRY_PATH").filter(|p| !p.trim().is_empty()) {
            self.registry_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("GPUMATCH_PATTERNS_PATH").filter(|p| !p.trim().is_empty()) {
            self.patterns_path = Some(PathBuf::from(path));
        }
        self.resolution = self.resolution.apply_env(&lookup)?;
        self.deduplication = self.deduplication.apply_env(&lookup)?;
        self.logging = self.logging.apply_env(&lookup)?;
        self.metrics = self.metrics.apply_env(&lookup)?;
        Ok(self)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for out-of-range thresholds.
    pub fn validate(&self) -> crate::Result<()> {
        self.resolution.validate()?;
        self.deduplication.validate()
    }

    /// Converts a `ConfigFile` to `GpuMatchConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self {
            registry_path: file.registry_path.map(PathBuf::from),
            patterns_path: file.patterns_path.map(PathBuf::from),
            ..Self::default()
        };

        if let Some(resolution) = file.resolution {
            if let Some(v) = resolution.fuzzy_threshold {
                config.resolution = config.resolution.with_fuzzy_threshold(v);
            }
            if let Some(terms) = resolution.foreign_vendor_terms {
                config.resolution = config.resolution.with_foreign_vendor_terms(terms);
            }
            if let Some(terms) = resolution.home_vendor_terms {
                config.resolution = config.resolution.with_home_vendor_terms(terms);
            }
        }
        if let Some(dedup) = file.deduplication {
            let mut d = config.deduplication;
            if let Some(v) = dedup.similarity_threshold {
                d = d.with_similarity_threshold(v);
            }
            if let Some(v) = dedup.price_epsilon {
                d = d.with_price_epsilon(v);
            }
            if let Some(v) = dedup.seller_relaxation {
                d = d.with_seller_relaxation(v);
            }
            if let Some(v) = dedup.warn_batch_size {
                d = d.with_warn_batch_size(v);
            }
            if let Some(domains) = dedup.marketplace_domains {
                d = d.with_marketplace_domains(domains);
            }
            config.deduplication = d;
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging = config.logging.with_format(LogFormat::parse(&format)?);
            }
            if let Some(file) = logging.file {
                config.logging = config.logging.with_file(file);
            }
        }
        if let Some(metrics) = file.metrics {
            if let Some(enabled) = metrics.enabled {
                config.metrics = config.metrics.with_enabled(enabled);
            }
        }

        Ok(config)
    }

    /// Sets the aliases document path.
    #[must_use]
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Sets the detection patterns document path.
    #[must_use]
    pub fn with_patterns_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.patterns_path = Some(path.into());
        self
    }

    /// Sets the resolution settings.
    #[must_use]
    pub fn with_resolution(mut self, resolution: ResolutionConfig) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the deduplication settings.
    #[must_use]
    pub fn with_deduplication(mut self, deduplication: DeduplicationConfig) -> Self {
        self.deduplication = deduplication;
        self
    }

    /// Sets the logging settings.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the metrics settings.
    #[must_use]
    pub const fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Reads `key` through `lookup` and parses it.
///
/// Unset and blank values yield `None`.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] naming `key` when the value does not
/// parse.
pub(crate) fn parse_env<T, F>(lookup: &F, key: &str) -> crate::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| crate::Error::InvalidInput(format!("{key}={raw:?}: {e}")))
}
