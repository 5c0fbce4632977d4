//! Structured logging configuration.

use crate::{Error, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "GPUMATCH_LOG";

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for anything but `pretty` or `json`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(Error::InvalidInput(format!(
                "log format must be 'pretty' or 'json', got {s:?}"
            ))),
        }
    }

    /// Returns the format name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

/// Logging configuration.
///
/// # Environment Variables
///
/// | Variable | Description |
/// |----------|-------------|
/// | `GPUMATCH_LOG` | Filter directive, takes precedence over `RUST_LOG` |
/// | `RUST_LOG` | Filter directive |
/// | `GPUMATCH_LOG_FORMAT` | `pretty` or `json` |
/// | `GPUMATCH_LOG_FILE` | Append logs to this file instead of stderr |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `GPUMATCH_LOG_FORMAT` names an
    /// unknown format.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(format) = lookup("GPUMATCH_LOG_FORMAT").filter(|f| !f.trim().is_empty()) {
            self.format = LogFormat::parse(&format).map_err(|_| {
                Error::InvalidInput(format!(
                    "GPUMATCH_LOG_FORMAT={format:?}: expected 'pretty' or 'json'"
                ))
            })?;
        }
        if let Some(file) = lookup("GPUMATCH_LOG_FILE").filter(|f| !f.trim().is_empty()) {
            self.file = Some(PathBuf::from(file));
        }
        Ok(self)
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Filter directive: `GPUMATCH_LOG`, then `RUST_LOG`, then `debug` when
    /// verbose and `info` otherwise.
    #[must_use]
    pub fn filter_directive<F>(verbose: bool, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(LOG_FILTER_ENV)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| default_directive(verbose).to_string())
    }

    /// Builds the subscriber filter from the process environment.
    ///
    /// An unparseable directive falls back to the default level.
    #[must_use]
    pub fn build_filter(verbose: bool) -> EnvFilter {
        let directive = Self::filter_directive(verbose, |key| std::env::var(key).ok());
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
    }
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test_case("json", Some(LogFormat::Json); "json")]
    #[test_case(" JSON ", Some(LogFormat::Json); "json mixed case")]
    #[test_case("pretty", Some(LogFormat::Pretty); "pretty")]
    #[test_case("xml", None; "unknown rejected")]
    fn test_log_format_parse(input: &str, expected: Option<LogFormat>) {
        assert_eq!(LogFormat::parse(input).ok(), expected);
    }

    #[test]
    fn test_apply_env() {
        let config = LoggingConfig::default()
            .apply_env(env(&[
                ("GPUMATCH_LOG_FORMAT", "json"),
                ("GPUMATCH_LOG_FILE", "/tmp/gpumatch.log"),
            ]))
            .expect("valid overrides");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/gpumatch.log")));
    }

    #[test]
    fn test_apply_env_rejects_unknown_format() {
        let result = LoggingConfig::default().apply_env(env(&[("GPUMATCH_LOG_FORMAT", "xml")]));
        assert!(matches!(
            result,
            Err(Error::InvalidInput(ref msg)) if msg.contains("GPUMATCH_LOG_FORMAT")
        ));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = LoggingConfig::default()
            .apply_env(env(&[("GPUMATCH_LOG_FILE", "  "), ("GPUMATCH_LOG_FORMAT", "")]))
            .expect("blank values are unset");
        assert!(config.file.is_none());
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_filter_directive_precedence() {
        let both = env(&[(LOG_FILTER_ENV, "gpumatch=trace"), ("RUST_LOG", "warn")]);
        assert_eq!(LoggingConfig::filter_directive(false, both), "gpumatch=trace");

        let rust_log = env(&[("RUST_LOG", "warn")]);
        assert_eq!(LoggingConfig::filter_directive(true, rust_log), "warn");

        assert_eq!(LoggingConfig::filter_directive(false, env(&[])), "info");
        assert_eq!(LoggingConfig::filter_directive(true, env(&[])), "debug");
    }
}
