//! Resolution configuration.

use crate::config::parse_env;
use crate::{Error, Result};

/// Default minimum fuzzy score (0-100) accepted by the fuzzy stage.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 70.0;

/// Vendor terms that mark a title as belonging to another GPU vendor.
pub const DEFAULT_FOREIGN_VENDOR_TERMS: &[&str] = &["intel", "amd", "radeon", "arc"];

/// Vendor terms that mark a title as belonging to the registry's vendor.
pub const DEFAULT_HOME_VENDOR_TERMS: &[&str] = &["nvidia", "geforce", "quadro", "tesla", "rtx"];

/// Configuration for the match cascade.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `GPUMATCH_FUZZY_THRESHOLD` | f64 | `70.0` | Minimum fuzzy score (0-100] |
///
/// # Example
///
/// ```rust
/// use gpumatch::ResolutionConfig;
///
/// let config = ResolutionConfig::default().with_fuzzy_threshold(80.0);
/// assert_eq!(config.fuzzy_threshold, 80.0);
/// assert!(config.validate().is_ok());
/// assert!(ResolutionConfig::default().with_fuzzy_threshold(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionConfig {
    /// Minimum fuzzy score, in `(0, 100]`.
    pub fuzzy_threshold: f64,

    /// Tokens identifying a competing vendor.
    ///
    /// A title containing one of these and none of `home_vendor_terms` skips
    /// the fuzzy stage.
    pub foreign_vendor_terms: Vec<String>,

    /// Tokens identifying the registry's own vendor.
    pub home_vendor_terms: Vec<String>,
}

impl ResolutionConfig {
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
        if let Some(threshold) = parse_env(&lookup, "GPUMATCH_FUZZY_THRESHOLD")? {
            self.fuzzy_threshold = threshold;
        }
        Ok(self)
    }

    /// Builder method to set the fuzzy threshold.
    #[must_use]
    pub const fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Builder method to set the foreign vendor terms.
    #[must_use]
    pub fn with_foreign_vendor_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreign_vendor_terms = lowered(terms);
        self
    }

    /// Builder method to set the home vendor terms.
    #[must_use]
    pub fn with_home_vendor_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.home_vendor_terms = lowered(terms);
        self
    }

    /// Checks that the threshold lies in `(0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an out-of-range threshold.
    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_threshold.is_finite()
            && self.fuzzy_threshold > 0.0
            && self.fuzzy_threshold <= 100.0
        {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "fuzzy_threshold must be in (0, 100], got {}",
                self.fuzzy_threshold
            )))
        }
    }
}

fn lowered<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    terms
        .into_iter()
        .map(|t| t.into().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            foreign_vendor_terms: lowered(DEFAULT_FOREIGN_VENDOR_TERMS.iter().copied()),
            home_vendor_terms: lowered(DEFAULT_HOME_VENDOR_TERMS.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = ResolutionConfig::default();
        assert!((config.fuzzy_threshold - 70.0).abs() < f64::EPSILON);
        assert_eq!(config.foreign_vendor_terms, vec!["intel", "amd", "radeon", "arc"]);
        assert!(config.home_vendor_terms.contains(&"nvidia".to_string()));
    }

    #[test_case(70.0, true ; "default")]
    #[test_case(100.0, true ; "upper bound")]
    #[test_case(0.0, false ; "zero")]
    #[test_case(100.5, false ; "above range")]
    #[test_case(f64::NAN, false ; "nan")]
    fn test_validate(threshold: f64, ok: bool) {
        let config = ResolutionConfig::default().with_fuzzy_threshold(threshold);
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_apply_env() {
        let config = ResolutionConfig::default()
            .apply_env(|key| (key == "GPUMATCH_FUZZY_THRESHOLD").then(|| "85".to_string()))
            .expect("valid override");
        assert!((config.fuzzy_threshold - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_env_rejects_garbage() {
        let result = ResolutionConfig::default().apply_env(|_| Some("ninety".to_string()));
        assert!(matches!(
            result,
            Err(Error::InvalidInput(ref msg)) if msg.contains("GPUMATCH_FUZZY_THRESHOLD")
        ));
    }

    #[test]
    fn test_vendor_terms_are_lowered() {
        let config = ResolutionConfig::default()
            .with_foreign_vendor_terms(["  Intel ", "", "MOORE"])
            .with_home_vendor_terms(vec!["NVIDIA".to_string()]);
        assert_eq!(config.foreign_vendor_terms, vec!["intel", "moore"]);
        assert_eq!(config.home_vendor_terms, vec!["nvidia"]);
    }
}
