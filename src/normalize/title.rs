//! Title normalization.

/// Lower-cases and trims a listing title.
///
/// Deliberately lightweight: inner whitespace and punctuation are preserved so
/// that exact matching stays a full-string comparison.
///
/// # Example
///
/// ```rust
/// use gpumatch::normalize_title;
///
/// assert_eq!(normalize_title("  NVIDIA RTX A6000 "), "nvidia rtx a6000");
/// assert_eq!(normalize_title(""), "");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Splits a normalized title into alphanumeric tokens.
///
/// Used for vendor-term detection, where `tesla-v100` must yield `tesla`.
pub fn title_tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}
