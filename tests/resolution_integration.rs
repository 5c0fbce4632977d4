//! Integration tests for canonical model resolution.
//!
//! Tests the match cascade against the built-in registry and against
//! registries loaded from alias and pattern documents on disk.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use gpumatch::services::resolution::{FuzzyOverride, FuzzyStage, MatchStage};
use gpumatch::{
    CanonicalRegistry, Error, MatchCascade, MatchKind, ResolutionConfig, UNKNOWN_MODEL_ID,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use test_case::test_case;

fn default_cascade() -> MatchCascade {
    MatchCascade::new(Arc::new(
        CanonicalRegistry::with_defaults().expect("default registry"),
    ))
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write document");
    path
}

// ============================================================================
// Built-in Registry
// ============================================================================

#[test_case("Tesla T4", "T4", MatchKind::Exact, 1.0; "exact alias")]
#[test_case("  RTX A6000 ", "RTX_A6000", MatchKind::Exact, 1.0; "exact after normalization")]
#[test_case("rtx_a6000", "RTX_A6000", MatchKind::Exact, 1.0; "exact canonical id")]
#[test_case("PNY NVIDIA H100 PCIe 80GB", "H100", MatchKind::Regex, 0.9; "regex h100")]
#[test_case("PNY NVIDIA A100 80GB PCIe", "A100_80GB", MatchKind::Regex, 0.9; "regex narrower sku first")]
#[test_case("NVIDIA RTX A2000 12GB", "RTX_A2000_12GB", MatchKind::Regex, 0.9; "regex a2000 12gb")]
#[test_case("nvidia teslla v10", "V100", MatchKind::Fuzzy, 0.72; "fuzzy typo")]
#[test_case("Quadro RTX A600", "RTX_A6000", MatchKind::Fuzzy, 0.8; "fuzzy truncated")]
fn test_resolves(title: &str, model_id: &str, kind: MatchKind, confidence: f64) {
    let result = default_cascade().resolve(title);
    assert_eq!(result.model_id, model_id);
    assert_eq!(result.match_kind, kind);
    assert!((result.confidence - confidence).abs() < 1e-9);
}

#[test_case("Intel Arc A310 4GB"; "intel")]
#[test_case("AMD Radeon RX 7900 XTX"; "amd")]
#[test_case("zzzz 9"; "noise")]
#[test_case(""; "empty")]
#[test_case("   "; "blank")]
fn test_unknown(title: &str) {
    let result = default_cascade().resolve(title);
    assert_eq!(result.model_id, UNKNOWN_MODEL_ID);
    assert_eq!(result.match_kind, MatchKind::None);
    assert!(result.confidence.abs() < f64::EPSILON);
    assert!(!result.is_resolved());
}

/// Alternates letter case: "rtx a6000" -> "RtX A6000".
fn alternate_case(text: &str) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

#[test]
fn test_every_registered_name_resolves_exact_in_any_case() {
    let registry = Arc::new(CanonicalRegistry::with_defaults().expect("default registry"));
    let cascade = MatchCascade::new(Arc::clone(&registry));

    for model in registry.iter() {
        let names = std::iter::once(model.id()).chain(model.aliases().iter().map(String::as_str));
        for name in names {
            for variant in [
                name.to_string(),
                name.to_uppercase(),
                name.to_lowercase(),
                alternate_case(name),
            ] {
                let result = cascade.resolve(&variant);
                assert_eq!(result.model_id, model.id(), "{variant:?}");
                assert_eq!(result.match_kind, MatchKind::Exact, "{variant:?}");
                assert!((result.confidence - 1.0).abs() < f64::EPSILON, "{variant:?}");
            }
        }
    }
}

#[test]
fn test_confidence_bands_hold_for_mixed_batch() {
    let titles = [
        "Tesla T4",
        "PNY NVIDIA H100 PCIe 80GB",
        "nvidia teslla v10",
        "AMD Radeon RX 7900 XTX",
    ];
    for result in default_cascade().resolve_batch(&titles) {
        match result.match_kind {
            MatchKind::Exact => assert!((result.confidence - 1.0).abs() < f64::EPSILON),
            MatchKind::Regex => assert!((result.confidence - 0.9).abs() < f64::EPSILON),
            MatchKind::Fuzzy => assert!(result.confidence > 0.0 && result.confidence <= 0.8),
            MatchKind::None => assert!(result.confidence.abs() < f64::EPSILON),
        }
    }
}

// Fuzzy near-misses onto a neighbouring SKU. Changing the vendor guard or the
// override list should change these deliberately.
#[test_case("GeForce RTX 4090", "RTX_A4000", 1400.0 / 17.0; "consumer card onto a4000")]
#[test_case("nvidia a1000", "A100_40GB", 100.0; "a1000 onto a100 alias")]
fn test_fuzzy_neighbouring_sku(title: &str, model_id: &str, score: f64) {
    let result = default_cascade().resolve(title);
    assert_eq!(result.model_id, model_id);
    assert_eq!(result.match_kind, MatchKind::Fuzzy);
    assert!(
        (result.confidence - 0.8 * score / 100.0).abs() < 1e-9,
        "confidence {}",
        result.confidence
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let cascade = default_cascade();
    let first = cascade.resolve("nvidia teslla v10");
    for _ in 0..10 {
        assert_eq!(cascade.resolve("nvidia teslla v10"), first);
    }
}

#[test]
fn test_cascade_is_shareable_across_threads() {
    let cascade = Arc::new(default_cascade());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cascade = Arc::clone(&cascade);
            std::thread::spawn(move || cascade.resolve("Tesla T4").model_id)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), "T4");
    }
}

#[test]
fn test_stricter_threshold_from_config() {
    let registry = Arc::new(CanonicalRegistry::with_defaults().expect("default registry"));
    let config = ResolutionConfig::default().with_fuzzy_threshold(95.0);
    let cascade = MatchCascade::with_config(registry, &config).expect("cascade");
    assert_eq!(cascade.resolve("nvidia teslla v10").model_id, UNKNOWN_MODEL_ID);
    assert_eq!(cascade.resolve("Quadro RTX A600").model_id, "RTX_A6000");
}

#[test]
fn test_fuzzy_override_list_is_configurable() {
    let registry = Arc::new(CanonicalRegistry::with_defaults().expect("default registry"));
    let config = ResolutionConfig::default();

    let with_override: Vec<Box<dyn MatchStage>> =
        vec![Box::new(FuzzyStage::new(Arc::clone(&registry), &config))];
    let cascade = MatchCascade::from_stages(Arc::clone(&registry), with_override);
    assert_eq!(cascade.resolve("A2000 workstation card").model_id, "RTX_A2000_12GB");

    let without_override: Vec<Box<dyn MatchStage>> = vec![Box::new(
        FuzzyStage::new(Arc::clone(&registry), &config).with_overrides(Vec::new()),
    )];
    let cascade = MatchCascade::from_stages(registry, without_override);
    assert_eq!(cascade.resolve("A2000 workstation card").model_id, "A2");
}

#[test]
fn test_custom_override_rule() {
    let registry = Arc::new(CanonicalRegistry::with_defaults().expect("default registry"));
    let stage: Box<dyn MatchStage> = Box::new(
        FuzzyStage::new(Arc::clone(&registry), &ResolutionConfig::default())
            .with_overrides(vec![FuzzyOverride::new("V100", ["teslla"])]),
    );
    let cascade = MatchCascade::from_stages(registry, vec![stage]);

    let result = cascade.resolve("nvidia teslla v10");
    assert_eq!(result.model_id, "V100");
    assert_eq!(result.match_kind, MatchKind::Fuzzy);
}

// ============================================================================
// Registry Documents
// ============================================================================

#[test]
fn test_load_aliases_and_patterns_from_files() {
    let dir = TempDir::new().expect("tempdir");
    let aliases = write(
        &dir,
        "aliases.json",
        r#"{"L4": ["l4", "nvidia l4"], "T4": ["tesla t4"]}"#,
    );
    let patterns = write(
        &dir,
        "patterns.json",
        r#"{"L4": "\\bl4\\b", "T4": "\\bt4\\b"}"#,
    );

    let registry =
        CanonicalRegistry::load(Some(aliases.as_path()), Some(patterns.as_path())).expect("load");
    let ids: Vec<&str> = registry.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["L4", "T4"]);

    let cascade = MatchCascade::new(Arc::new(registry));
    assert_eq!(cascade.resolve("nvidia l4").match_kind, MatchKind::Exact);
    assert_eq!(cascade.resolve("PNY T4 16GB").model_id, "T4");
    assert_eq!(cascade.resolve("H100 SXM").model_id, UNKNOWN_MODEL_ID);
}

#[test]
fn test_aliases_file_with_builtin_patterns() {
    let dir = TempDir::new().expect("tempdir");
    let aliases = write(&dir, "aliases.json", r#"{"V100": ["v100 sxm2"]}"#);

    let registry = CanonicalRegistry::load(Some(aliases.as_path()), None).expect("load");
    assert_eq!(registry.len(), 1);
    let cascade = MatchCascade::new(Arc::new(registry));
    assert_eq!(cascade.resolve("Tesla V100 16GB").match_kind, MatchKind::Regex);
}

#[test]
fn test_invalid_pattern_fails_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let aliases = write(&dir, "aliases.json", r#"{"T4": ["t4"]}"#);
    let patterns = write(&dir, "patterns.json", r#"{"T4": "(unclosed"}"#);

    let result = CanonicalRegistry::load(Some(aliases.as_path()), Some(patterns.as_path()));
    assert!(matches!(result, Err(Error::InvalidRegistry { ref id, .. }) if id == "T4"));
}

#[test]
fn test_missing_pattern_fails_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let aliases = write(&dir, "aliases.json", r#"{"T4": ["t4"], "L4": ["l4"]}"#);
    let patterns = write(&dir, "patterns.json", r#"{"T4": "\\bt4\\b"}"#);

    let result = CanonicalRegistry::load(Some(aliases.as_path()), Some(patterns.as_path()));
    assert!(matches!(result, Err(Error::InvalidRegistry { ref id, .. }) if id == "L4"));
}

#[test]
fn test_reserved_unknown_id_rejected() {
    let result = CanonicalRegistry::from_json_str(
        r#"{"UNKNOWN": ["mystery card"]}"#,
        Some(r#"{"UNKNOWN": "mystery"}"#),
    );
    assert!(matches!(result, Err(Error::InvalidRegistry { .. })));
}

#[test]
fn test_missing_document_is_operation_failure() {
    let dir = TempDir::new().expect("tempdir");
    let result = CanonicalRegistry::load(Some(dir.path().join("absent.json").as_path()), None);
    assert!(matches!(result, Err(Error::OperationFailed { .. })));
}
