//! String canonicalization shared by the engines.
//!
//! - [`normalize_title`]: case-fold and trim, used by every cascade stage
//! - [`UrlNormalizer`]: canonical listing URLs for the duplicate URL signal

mod title;
mod url;

pub use self::url::{MarketplaceRule, UrlNormalizer};
pub use title::{normalize_title, title_tokens};
