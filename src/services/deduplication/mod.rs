//! Duplicate listing detection.
//!
//! Listings of the same physical offer are scraped from several sources with
//! slightly different titles, tracking-laden URLs and drifting prices. The
//! [`DuplicateClusterer`] groups them so downstream pricing counts each offer
//! once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    DuplicateClusterer                        │
//! │  ┌─────────────────┐   ┌──────────────┐   ┌────────────────┐ │
//! │  │ SimilarityMatrix│──▶│ Greedy walk  │──▶│ Confirmation   │ │
//! │  │                 │   │              │   │                │ │
//! │  │ title embeddings│   │ input order, │   │ url → price →  │ │
//! │  │ N x N cosine    │   │ claimed set  │   │ seller         │ │
//! │  └─────────────────┘   └──────────────┘   └────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod clusterer;
mod config;
mod similarity;

pub use clusterer::{DuplicateClusterer, DuplicateGroup, cluster_groups};
pub use config::DeduplicationConfig;
pub use similarity::SimilarityMatrix;
