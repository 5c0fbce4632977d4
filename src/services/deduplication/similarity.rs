//! Pairwise title similarity.

use crate::Result;
use crate::embedding::{Embedder, cosine_similarity};
use tracing::instrument;

/// Dense N x N cosine similarity matrix over a batch of titles.
///
/// Symmetric, with `1.0` on the diagonal for non-empty titles. Empty titles
/// are never sent to the embedder; they get a zero vector and therefore a
/// similarity of `0.0` to everything, including themselves.
///
/// # Example
///
/// ```rust
/// use gpumatch::TokenHashEmbedder;
/// use gpumatch::services::deduplication::SimilarityMatrix;
///
/// let titles = ["NVIDIA RTX 3080", "NVIDIA GeForce RTX 3080", ""];
/// let matrix = SimilarityMatrix::build(&TokenHashEmbedder::new(), &titles)?;
///
/// assert_eq!(matrix.len(), 3);
/// assert!(matrix.get(0, 1) > 0.85);
/// assert_eq!(matrix.get(2, 0), 0.0);
/// # Ok::<(), gpumatch::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Embeds `titles` in one batch call and computes every pairwise cosine.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails or returns the wrong number of
    /// vectors.
    #[instrument(skip(embedder, titles), fields(operation = "similarity_matrix", batch_size = titles.len()))]
    pub fn build<E, S>(embedder: &E, titles: &[S]) -> Result<Self>
    where
        E: Embedder + ?Sized,
        S: AsRef<str>,
    {
        let size = titles.len();
        if size == 0 {
            return Ok(Self {
                size,
                values: Vec::new(),
            });
        }

        let non_empty: Vec<(usize, &str)> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.as_ref()))
            .filter(|(_, t)| !t.trim().is_empty())
            .collect();

        let embedded = if non_empty.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<&str> = non_empty.iter().map(|(_, t)| *t).collect();
            embedder.embed_batch(&texts)?
        };

        if embedded.len() != non_empty.len() {
            return Err(crate::Error::OperationFailed {
                operation: "similarity_matrix".to_string(),
                cause: format!(
                    "embedder returned {} vectors for {} titles",
                    embedded.len(),
                    non_empty.len()
                ),
            });
        }

        let mut vectors: Vec<Vec<f32>> = vec![Vec::new(); size];
        for ((index, _), vector) in non_empty.into_iter().zip(embedded) {
            vectors[index] = vector;
        }

        Ok(Self::from_vectors(&vectors))
    }

    /// Computes the matrix from precomputed vectors.
    ///
    /// Empty or zero vectors score `0.0` against everything.
    #[must_use]
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Self {
        let size = vectors.len();
        let mut values = vec![0.0f32; size * size];
        for i in 0..size {
            for j in i..size {
                let sim = cosine_similarity(&vectors[i], &vectors[j]);
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }
        Self { size, values }
    }

    /// Number of titles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity of titles `i` and `j`; `0.0` out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        if i >= self.size || j >= self.size {
            return 0.0;
        }
        self.values[i * self.size + j]
    }

    /// Indices `j != i` with similarity at or above `threshold`, ascending.
    pub fn candidates(&self, i: usize, threshold: f32) -> impl Iterator<Item = (usize, f32)> + '_ {
        (0..self.size)
            .filter(move |&j| j != i)
            .map(move |j| (j, self.get(i, j)))
            .filter(move |&(_, sim)| sim >= threshold)
    }
}
