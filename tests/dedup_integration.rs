//! Integration tests for duplicate clustering and the listing pipeline.
//!
//! Uses the token-hash embedder so that similarities are deterministic and
//! independent of any downloaded model.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use gpumatch::cli::parse_listings;
use gpumatch::models::DuplicateReason;
use gpumatch::services::pipeline::{self, PipelineSummary};
use gpumatch::{
    CanonicalRegistry, DeduplicationConfig, DuplicateAssignment, DuplicateClusterer,
    DuplicateStatus, Embedder, ListingPipeline, ListingRecord, MatchCascade, TokenHashEmbedder,
};
use std::sync::Arc;

const A6000: &str = "NVIDIA RTX A6000 48GB";
const A6000_WORKSTATION: &str = "NVIDIA RTX A6000 48GB Workstation";
const A6000_GDDR6: &str = "NVIDIA RTX A6000 48GB GDDR6";

fn clusterer() -> DuplicateClusterer {
    let embedder: Arc<dyn Embedder> = Arc::new(TokenHashEmbedder::new());
    DuplicateClusterer::new(embedder)
}

fn clusterer_with(config: DeduplicationConfig) -> DuplicateClusterer {
    let embedder: Arc<dyn Embedder> = Arc::new(TokenHashEmbedder::new());
    DuplicateClusterer::with_config(embedder, config).expect("valid config")
}

fn statuses(assignments: &[DuplicateAssignment]) -> Vec<DuplicateStatus> {
    assignments.iter().map(|a| a.status).collect()
}

// ============================================================================
// Confirmation Criteria
// ============================================================================

#[test]
fn test_price_confirms_similar_titles() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new(A6000).with_price(4500.0),
            ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
        ])
        .expect("cluster");

    assert_eq!(out[0], DuplicateAssignment::primary(1));
    assert_eq!(out[1].status, DuplicateStatus::DuplicateSecondary);
    assert_eq!(out[1].group_id, Some(1));
    assert_eq!(out[1].matched_by, Some(DuplicateReason::Price));
    let similarity = out[1].similarity.expect("similarity recorded");
    assert!((similarity - 0.8944).abs() < 1e-3);
}

#[test]
fn test_url_confirms_despite_price_gap() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("PNY NVIDIA A100 80GB PCIe")
                .with_price(9000.0)
                .with_url("https://www.ebay.com/itm/PNY-A100-80GB/314159265358?_trkparms=abc"),
            ListingRecord::new("NVIDIA A100 80GB PCIe")
                .with_price(12000.0)
                .with_url("https://www.ebay.com/itm/314159265358?hash=item1"),
        ])
        .expect("cluster");

    assert_eq!(out[1].matched_by, Some(DuplicateReason::Url));
    assert_eq!(out[1].group_id, Some(1));
}

#[test]
fn test_seller_confirms_without_price() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("NVIDIA RTX 3080").with_seller("GPU Outlet"),
            ListingRecord::new("NVIDIA GeForce RTX 3080").with_seller("GPU Outlet"),
        ])
        .expect("cluster");

    assert_eq!(out[1].matched_by, Some(DuplicateReason::Seller));
}

#[test]
fn test_seller_comparison_is_case_sensitive() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("NVIDIA RTX 3080").with_seller("Acme"),
            ListingRecord::new("NVIDIA GeForce RTX 3080").with_seller("acme"),
        ])
        .expect("cluster");

    assert_eq!(
        statuses(&out),
        vec![DuplicateStatus::Unique, DuplicateStatus::Unique]
    );
}

#[test]
fn test_similar_titles_without_confirmation_stay_unique() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new(A6000).with_price(4500.0),
            ListingRecord::new(A6000_WORKSTATION).with_price(6000.0),
        ])
        .expect("cluster");

    assert_eq!(
        statuses(&out),
        vec![DuplicateStatus::Unique, DuplicateStatus::Unique]
    );
}

#[test]
fn test_dissimilar_titles_never_grouped() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("Tesla T4").with_price(700.0),
            ListingRecord::new("NVIDIA Tesla T4 16GB").with_price(700.0),
        ])
        .expect("cluster");

    assert!(out.iter().all(|a| *a == DuplicateAssignment::unique()));
}

#[test]
fn test_empty_titles_never_grouped() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("").with_price(100.0),
            ListingRecord::new("   ").with_price(100.0),
        ])
        .expect("cluster");

    assert!(out.iter().all(|a| a.status == DuplicateStatus::Unique));
}

#[test]
fn test_custom_marketplace_domain() {
    let listings = [
        ListingRecord::new(A6000)
            .with_price(4000.0)
            .with_url("https://www.mercari.com/itm/rtx-a6000/555123"),
        ListingRecord::new(A6000_WORKSTATION)
            .with_price(5200.0)
            .with_url("https://www.mercari.com/itm/555123?ref=feed"),
    ];

    let default_out = clusterer().cluster(&listings).expect("cluster");
    assert_eq!(default_out[1].status, DuplicateStatus::Unique);

    let config = DeduplicationConfig::default().with_marketplace_domains(["ebay.", "mercari."]);
    let out = clusterer_with(config).cluster(&listings).expect("cluster");
    assert_eq!(out[1].matched_by, Some(DuplicateReason::Url));
}

// ============================================================================
// Greedy Walk
// ============================================================================

#[test]
fn test_price_tolerance_is_relative_to_scanning_listing() {
    let low_first = clusterer()
        .cluster(&[
            ListingRecord::new(A6000).with_price(100.0),
            ListingRecord::new(A6000).with_price(105.2),
        ])
        .expect("cluster");
    assert_eq!(low_first[1].status, DuplicateStatus::Unique);

    let high_first = clusterer()
        .cluster(&[
            ListingRecord::new(A6000).with_price(105.2),
            ListingRecord::new(A6000).with_price(100.0),
        ])
        .expect("cluster");
    assert_eq!(high_first[1].matched_by, Some(DuplicateReason::Price));
}

#[test]
fn test_primary_claims_all_confirmed_candidates() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new(A6000).with_price(4500.0),
            ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
            ListingRecord::new(A6000_GDDR6).with_price(4550.0),
        ])
        .expect("cluster");

    assert_eq!(
        statuses(&out),
        vec![
            DuplicateStatus::DuplicatePrimary,
            DuplicateStatus::DuplicateSecondary,
            DuplicateStatus::DuplicateSecondary,
        ]
    );
    assert!(out.iter().all(|a| a.group_id == Some(1)));
}

#[test]
fn test_result_depends_on_input_order() {
    // The two variants are only 0.8 similar to each other, so whichever
    // variant scans first leaves the other one out.
    let out = clusterer()
        .cluster(&[
            ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
            ListingRecord::new(A6000_GDDR6).with_price(4550.0),
            ListingRecord::new(A6000).with_price(4500.0),
        ])
        .expect("cluster");

    assert_eq!(out[0], DuplicateAssignment::primary(1));
    assert_eq!(out[1], DuplicateAssignment::unique());
    assert_eq!(out[2].status, DuplicateStatus::DuplicateSecondary);
    assert_eq!(out[2].group_id, Some(1));
}

#[test]
fn test_group_ids_are_sequential() {
    let out = clusterer()
        .cluster(&[
            ListingRecord::new("NVIDIA Tesla T4 16GB").with_price(700.0),
            ListingRecord::new(A6000).with_price(4500.0),
            ListingRecord::new("NVIDIA Tesla T4").with_price(710.0),
            ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
        ])
        .expect("cluster");

    let groups: Vec<Option<u32>> = out.iter().map(|a| a.group_id).collect();
    assert_eq!(groups, vec![Some(1), Some(2), Some(1), Some(2)]);
}

#[test]
fn test_oversized_batch_is_processed() {
    let config = DeduplicationConfig::default().with_warn_batch_size(2);
    let out = clusterer_with(config)
        .cluster(&[
            ListingRecord::new(A6000).with_price(4500.0),
            ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
            ListingRecord::new("Tesla T4"),
        ])
        .expect("cluster");
    assert_eq!(out.len(), 3);
    assert_eq!(out[1].group_id, Some(1));
}

#[test]
fn test_clustering_is_deterministic() {
    let listings = vec![
        ListingRecord::new(A6000).with_price(4500.0),
        ListingRecord::new(A6000_WORKSTATION).with_price(4600.0),
        ListingRecord::new("NVIDIA Tesla T4").with_price(700.0),
    ];
    let clusterer = clusterer();
    let first = clusterer.cluster(&listings).expect("cluster");
    assert_eq!(clusterer.cluster(&listings).expect("cluster"), first);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_pipeline_over_json_batch() {
    let listings = parse_listings(
        r#"[
            {"title": "NVIDIA RTX A6000 48GB", "price": 4500.0, "seller": "outlet"},
            {"title": "NVIDIA RTX A6000 48GB Workstation", "price": 4600.0},
            {"title": "AMD Radeon RX 7900 XTX", "price": 950.0},
            {"title": "nvidia teslla v10"},
            {"title": ""}
        ]"#,
    )
    .expect("parse");

    let registry = Arc::new(CanonicalRegistry::with_defaults().expect("default registry"));
    let embedder: Arc<dyn Embedder> = Arc::new(TokenHashEmbedder::new());
    let pipeline = ListingPipeline::new(MatchCascade::new(registry), DuplicateClusterer::new(embedder));

    let reports = pipeline.process(&listings).expect("process");
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[0].resolution.model_id, "RTX_A6000");
    assert_eq!(reports[3].resolution.model_id, "V100");
    assert!(!reports[2].resolution.is_resolved());
    assert!(!reports[4].resolution.is_resolved());

    let summary = PipelineSummary::from_reports(&reports);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.unknown, 2);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicates, 1);

    let groups = pipeline::groups(&reports);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].primary, 0);
    assert_eq!(groups[0].secondaries, vec![1]);
}
