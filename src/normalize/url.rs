//! Listing URL canonicalization.
//!
//! Two listings scraped from the same marketplace page often differ only in
//! tracking parameters or in the decorative title slug. Canonical URLs collapse
//! those variants so URL equality can serve as a duplicate signal.

use ::url::Url;

/// Marketplace-specific URL rule.
///
/// Hosts containing `domain` whose path has an `item_segment` component are
/// rebuilt as `scheme://host/<item_segment>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceRule {
    /// Substring identifying the marketplace host, e.g. `ebay.`.
    pub domain: String,
    /// Path segment that precedes the item identifier, e.g. `itm`.
    pub item_segment: String,
}

impl MarketplaceRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(domain: impl Into<String>, item_segment: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            item_segment: item_segment.into(),
        }
    }

    /// The eBay item rule (`/itm/<slug>/<id>` and `/itm/<id>`).
    #[must_use]
    pub fn ebay() -> Self {
        Self::new("ebay.", "itm")
    }

    /// Extracts the item id from path segments.
    ///
    /// Prefers the last all-digit segment after the marker, falling back to the
    /// first segment after it.
    fn item_id<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Option<&'a str> {
        let after: Vec<&str> = segments
            .skip_while(|s| *s != self.item_segment)
            .skip(1)
            .filter(|s| !s.is_empty())
            .collect();

        after
            .iter()
            .rev()
            .find(|s| s.chars().all(|c| c.is_ascii_digit()))
            .or_else(|| after.first())
            .copied()
    }
}

/// Canonicalizes listing source URLs.
///
/// # Example
///
/// ```rust
/// use gpumatch::UrlNormalizer;
///
/// let normalizer = UrlNormalizer::default();
///
/// let a = normalizer.normalize(Some("https://www.ebay.com/itm/RTX-A6000-48GB/1234567890?_trkparms=x"));
/// let b = normalizer.normalize(Some("https://www.ebay.com/itm/1234567890?hash=item1"));
/// assert_eq!(a, "https://www.ebay.com/itm/1234567890");
/// assert_eq!(a, b);
///
/// assert_eq!(normalizer.normalize(Some("https://shop.example.com/gpus/a100/?ref=feed")),
///            "https://shop.example.com/gpus/a100");
/// assert_eq!(normalizer.normalize(None), "");
/// ```
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    rules: Vec<MarketplaceRule>,
}

impl UrlNormalizer {
    /// Creates a normalizer with the given marketplace rules.
    #[must_use]
    pub const fn new(rules: Vec<MarketplaceRule>) -> Self {
        Self { rules }
    }

    /// Creates a normalizer treating each domain as an `itm`-style marketplace.
    #[must_use]
    pub fn from_domains<S: AsRef<str>>(domains: &[S]) -> Self {
        Self::new(
            domains
                .iter()
                .map(|d| MarketplaceRule::new(d.as_ref(), "itm"))
                .collect(),
        )
    }

    /// Returns the marketplace rules.
    #[must_use]
    pub fn rules(&self) -> &[MarketplaceRule] {
        &self.rules
    }

    /// Returns the canonical form of `url`, or an empty string for a missing
    /// or blank input.
    #[must_use]
    pub fn normalize(&self, url: Option<&str>) -> String {
        let Some(raw) = url.map(str::trim).filter(|s| !s.is_empty()) else {
            return String::new();
        };

        match Url::parse(raw) {
            Ok(parsed) if parsed.host_str().is_some() => self.canonical(&parsed),
            _ => Self::textual(raw),
        }
    }

    fn canonical(&self, parsed: &Url) -> String {
        let scheme = parsed.scheme();
        let host = parsed.host_str().unwrap_or_default().to_lowercase();

        if let Some(rule) = self.rules.iter().find(|r| host.contains(&r.domain)) {
            let item = parsed
                .path_segments()
                .and_then(|segments| rule.item_id(segments));
            if let Some(id) = item {
                return format!("{scheme}://{host}/{}/{id}", rule.item_segment);
            }
        }

        let path = parsed.path().trim_end_matches('/');
        format!("{scheme}://{host}{path}")
    }

    /// Fallback for strings that are not absolute URLs.
    fn textual(raw: &str) -> String {
        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        raw[..end].trim_end_matches('/').to_lowercase()
    }
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(vec![MarketplaceRule::ebay()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(
        "https://www.ebay.com/itm/NVIDIA-RTX-A6000-48GB-GDDR6/175012345678?hash=item28&var=0",
        "https://www.ebay.com/itm/175012345678" ; "ebay slug and tracking"
    )]
    #[test_case(
        "https://www.ebay.com/itm/175012345678",
        "https://www.ebay.com/itm/175012345678" ; "ebay bare id"
    )]
    #[test_case(
        "https://www.ebay.co.uk/itm/175012345678/?_trksid=p2047675",
        "https://www.ebay.co.uk/itm/175012345678" ; "ebay regional host"
    )]
    #[test_case(
        "https://WWW.EBAY.COM/itm/some-slug",
        "https://www.ebay.com/itm/some-slug" ; "ebay without numeric id"
    )]
    #[test_case(
        "https://www.ebay.com/sch/i.html?_nkw=a100",
        "https://www.ebay.com/sch/i.html" ; "ebay non item page"
    )]
    #[test_case(
        "https://shop.example.com/gpu/a100-80gb/?utm_source=feed#specs",
        "https://shop.example.com/gpu/a100-80gb" ; "generic strip query and fragment"
    )]
    #[test_case(
        "https://shop.example.com/?ref=home",
        "https://shop.example.com" ; "generic root"
    )]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(UrlNormalizer::default().normalize(Some(input)), expected);
    }

    #[test]
    fn test_blank_inputs() {
        let normalizer = UrlNormalizer::default();
        assert_eq!(normalizer.normalize(None), "");
        assert_eq!(normalizer.normalize(Some("")), "");
        assert_eq!(normalizer.normalize(Some("   ")), "");
    }

    #[test]
    fn test_unparseable_falls_back_to_text() {
        let normalizer = UrlNormalizer::default();
        assert_eq!(
            normalizer.normalize(Some("Shop.Example.com/gpu/T4/?ref=x")),
            "shop.example.com/gpu/t4"
        );
    }

    #[test]
    fn test_unknown_marketplace_uses_generic_rule() {
        let normalizer = UrlNormalizer::new(Vec::new());
        assert_eq!(
            normalizer.normalize(Some("https://www.ebay.com/itm/slug/123?x=1")),
            "https://www.ebay.com/itm/slug/123"
        );
    }

    #[test]
    fn test_from_domains() {
        let normalizer = UrlNormalizer::from_domains(&["ebay.", "mercari."]);
        assert_eq!(normalizer.rules().len(), 2);
        assert_eq!(
            normalizer.normalize(Some("https://jp.mercari.com/itm/m123/456?src=a")),
            "https://jp.mercari.com/itm/456"
        );
    }
}
