//! Hashed bag-of-tokens embedder.

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::Result;
use crate::normalize::title_tokens;
use sha2::{Digest, Sha256};

/// Upper bound on tokens hashed per text.
const MAX_TOKENS: usize = 1000;

/// Deterministic embedder using signed feature hashing of title tokens.
///
/// Each lower-cased alphanumeric token is hashed with SHA-256; the first eight
/// digest bytes pick a dimension and the low bit of the ninth picks the sign.
/// The summed vector is L2-normalized. Titles sharing most of their tokens land
/// close together, which is what listing deduplication needs, while the
/// output stays identical across platforms and releases.
///
/// # Example
///
/// ```rust
/// use gpumatch::{Embedder, TokenHashEmbedder};
/// use gpumatch::embedding::cosine_similarity;
///
/// let embedder = TokenHashEmbedder::new();
/// let a = embedder.embed("NVIDIA RTX 3080").unwrap();
/// let b = embedder.embed("nvidia geforce rtx 3080").unwrap();
///
/// assert_eq!(a.len(), 384);
/// assert!(cosine_similarity(&a, &b) > 0.85);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokenHashEmbedder {
    dimensions: usize,
}

impl TokenHashEmbedder {
    /// Creates an embedder with [`DEFAULT_DIMENSIONS`] dimensions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Creates an embedder with custom dimensions (at least 1).
    #[must_use]
    pub const fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: if dimensions == 0 { 1 } else { dimensions },
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(head) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 1 { -1.0 } else { 1.0 };
        (index, sign)
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in title_tokens(&lowered).take(MAX_TOKENS) {
            let (index, sign) = self.bucket(token);
            embedding[index] += sign;
        }

        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq > 0.0 {
            let inv_norm = norm_sq.sqrt().recip();
            for v in &mut embedding {
                *v *= inv_norm;
            }
        }
        embedding
    }
}

impl Default for TokenHashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for TokenHashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.hash_embed(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    fn similarity(a: &str, b: &str) -> f32 {
        let embedder = TokenHashEmbedder::new();
        cosine_similarity(
            &embedder.embed(a).expect("embed"),
            &embedder.embed(b).expect("embed"),
        )
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(TokenHashEmbedder::new().dimensions(), DEFAULT_DIMENSIONS);
        assert_eq!(TokenHashEmbedder::with_dimensions(64).dimensions(), 64);
        assert_eq!(TokenHashEmbedder::with_dimensions(0).dimensions(), 1);
    }

    #[test]
    fn test_embedding_is_unit_length() {
        let embedding = TokenHashEmbedder::new()
            .embed("NVIDIA A100 80GB PCIe")
            .expect("embed");
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedding = TokenHashEmbedder::new().embed("  --  ").expect("embed");
        assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let embedder = TokenHashEmbedder::new();
        let first = embedder.embed("Tesla T4 16GB").expect("embed");
        let second = embedder.embed("Tesla T4 16GB").expect("embed");
        assert_eq!(first, second);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert!((similarity("RTX-A6000 (48GB)", "rtx a6000 48gb") - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_tokens_score_high() {
        assert!(similarity("NVIDIA RTX 3080", "NVIDIA GeForce RTX 3080") > 0.85);
        assert!(similarity("NVIDIA RTX A6000 48GB", "NVIDIA RTX A6000 48GB Workstation") > 0.85);
    }

    #[test]
    fn test_different_models_score_low() {
        assert!(similarity("NVIDIA RTX 3080", "NVIDIA RTX A6000") < 0.85);
        assert!(similarity("NVIDIA RTX A6000 48GB", "AMD Radeon RX 7900 XTX") < 0.5);
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = TokenHashEmbedder::with_dimensions(32);
        let batch = embedder.embed_batch(&["h100", "l40s"]).expect("batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed("h100").expect("embed"));
    }
}
