//! Listing input records.

use serde::{Deserialize, Serialize};

/// One row of raw marketplace input.
///
/// Only `title` is always present; every other field is an optional signal
/// that the engines treat as "no information" when absent.
///
/// # Example
///
/// ```rust
/// use gpumatch::ListingRecord;
///
/// let listing = ListingRecord::new("NVIDIA RTX A6000 48GB")
///     .with_price(4_200.0)
///     .with_seller("gpu-outlet");
///
/// assert_eq!(listing.title, "NVIDIA RTX A6000 48GB");
/// assert_eq!(listing.price, Some(4_200.0));
/// assert!(listing.url.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Free-text listing title.
    #[serde(default)]
    pub title: String,

    /// Asking price, when the source exposes one.
    #[serde(default)]
    pub price: Option<f64>,

    /// Source URL of the listing.
    #[serde(default)]
    pub url: Option<String>,

    /// Seller or storefront name.
    #[serde(default)]
    pub seller: Option<String>,
}

impl ListingRecord {
    /// Creates a record with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the price.
    #[must_use]
    pub const fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the source URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the seller.
    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// Returns the price if it can take part in a relative comparison.
    pub(crate) fn usable_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite())
    }

    /// Returns the seller as given, or `None` when missing or blank.
    pub(crate) fn usable_seller(&self) -> Option<&str> {
        self.seller.as_deref().filter(|s| !s.trim().is_empty())
    }
}
