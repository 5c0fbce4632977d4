//! Duplicate assignment types.
//!
//! One [`DuplicateAssignment`] is produced per listing in a batch, index
//! aligned with the input.

use serde::{Deserialize, Serialize};

/// Cluster role of a listing within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicateStatus {
    /// Not part of any duplicate cluster.
    Unique,
    /// Elected representative of a cluster.
    DuplicatePrimary,
    /// Member of a cluster represented by another listing.
    DuplicateSecondary,
}

impl DuplicateStatus {
    /// Returns the status label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "UNIQUE",
            Self::DuplicatePrimary => "DUPLICATE_PRIMARY",
            Self::DuplicateSecondary => "DUPLICATE_SECONDARY",
        }
    }
}

impl std::fmt::Display for DuplicateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signal that confirmed a similarity candidate as a duplicate.
///
/// Criteria are checked in declaration order; the first that holds is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    /// Normalized listing URLs are equal.
    Url,
    /// Relative price difference is within tolerance.
    Price,
    /// Same seller, with a relaxed similarity bar.
    Seller,
}

impl std::fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url => write!(f, "url"),
            Self::Price => write!(f, "price"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// Duplicate clustering outcome for one listing.
///
/// `group_id` is set for every cluster member and unique per cluster, but only
/// stable within the batch that produced it.
///
/// # Example
///
/// ```rust
/// use gpumatch::{DuplicateAssignment, DuplicateStatus};
/// use gpumatch::models::DuplicateReason;
///
/// let primary = DuplicateAssignment::primary(1);
/// let secondary = DuplicateAssignment::secondary(1, DuplicateReason::Price, 0.91);
///
/// assert_eq!(primary.status, DuplicateStatus::DuplicatePrimary);
/// assert_eq!(primary.group_id, secondary.group_id);
/// assert!(DuplicateAssignment::unique().group_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateAssignment {
    /// Role within the batch.
    pub status: DuplicateStatus,

    /// Cluster id, `None` for unique listings.
    pub group_id: Option<u32>,

    /// Criterion that confirmed a secondary member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<DuplicateReason>,

    /// Title similarity between a secondary and its primary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl DuplicateAssignment {
    /// A listing outside any cluster.
    #[must_use]
    pub const fn unique() -> Self {
        Self {
            status: DuplicateStatus::Unique,
            group_id: None,
            matched_by: None,
            similarity: None,
        }
    }

    /// The primary of cluster `group_id`.
    #[must_use]
    pub const fn primary(group_id: u32) -> Self {
        Self {
            status: DuplicateStatus::DuplicatePrimary,
            group_id: Some(group_id),
            matched_by: None,
            similarity: None,
        }
    }

    /// A secondary member of cluster `group_id`.
    #[must_use]
    pub const fn secondary(group_id: u32, reason: DuplicateReason, similarity: f32) -> Self {
        Self {
            status: DuplicateStatus::DuplicateSecondary,
            group_id: Some(group_id),
            matched_by: Some(reason),
            similarity: Some(similarity),
        }
    }

    /// Whether the listing belongs to a cluster.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.status != DuplicateStatus::Unique
    }
}

impl Default for DuplicateAssignment {
    fn default() -> Self {
        Self::unique()
    }
}
