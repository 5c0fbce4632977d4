//! FastEmbed-based embedder.
//!
//! With the `fastembed-embeddings` feature this runs all-MiniLM-L6-v2 through
//! ONNX for semantic title embeddings. Without it, [`FastEmbedEmbedder`] keeps
//! the same API and delegates to [`TokenHashEmbedder`].

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::{Error, Result};

#[cfg(feature = "fastembed-embeddings")]
mod native {
    use super::{DEFAULT_DIMENSIONS, Embedder, Error, Result};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::OnceLock;
    use std::time::Instant;

    /// Process-wide model, loaded on first use.
    static EMBEDDING_MODEL: OnceLock<fastembed::TextEmbedding> = OnceLock::new();

    const MODEL_NAME: &str = "all-MiniLM-L6-v2";

    /// `FastEmbed` embedder using all-MiniLM-L6-v2.
    ///
    /// The model is loaded lazily on the first embed call; the first call blocks
    /// while the ONNX model loads.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FastEmbedEmbedder;

    impl FastEmbedEmbedder {
        /// Embedding dimensions of all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Creates a new `FastEmbed` embedder.
        #[must_use]
        pub const fn new() -> Self {
            Self
        }

        /// Returns the model name.
        #[must_use]
        pub const fn model_name(&self) -> &'static str {
            MODEL_NAME
        }

        fn get_model() -> Result<&'static fastembed::TextEmbedding> {
            if let Some(model) = EMBEDDING_MODEL.get() {
                return Ok(model);
            }

            tracing::info!(model = MODEL_NAME, "Loading embedding model (first use)");
            let start = Instant::now();

            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);

            let model =
                fastembed::TextEmbedding::try_new(options).map_err(|e| Error::OperationFailed {
                    operation: "load_embedding_model".to_string(),
                    cause: e.to_string(),
                })?;

            tracing::info!(
                elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                model = MODEL_NAME,
                "Embedding model loaded"
            );

            // Another thread may have won the race; either model is fine.
            let _ = EMBEDDING_MODEL.set(model);
            EMBEDDING_MODEL.get().ok_or_else(|| Error::OperationFailed {
                operation: "get_embedding_model".to_string(),
                cause: "model initialization race".to_string(),
            })
        }

        fn run(operation: &str, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            let model = Self::get_model()?;
            let batch_size = texts.len();

            // ONNX runtime can panic on malformed input.
            let result = catch_unwind(AssertUnwindSafe(|| model.embed(texts, None)));

            result
                .map_err(|panic_info| {
                    let panic_msg = panic_info
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic_info.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(
                        panic_message = %panic_msg,
                        batch_size,
                        "ONNX runtime panicked during embedding"
                    );
                    Error::OperationFailed {
                        operation: operation.to_string(),
                        cause: format!("ONNX runtime panic: {panic_msg}"),
                    }
                })?
                .map_err(|e| Error::OperationFailed {
                    operation: operation.to_string(),
                    cause: e.to_string(),
                })
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            Self::DEFAULT_DIMENSIONS
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.is_empty() {
                return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
            }

            Self::run("embed", vec![text.to_string()])?
                .into_iter()
                .next()
                .ok_or_else(|| Error::OperationFailed {
                    operation: "embed".to_string(),
                    cause: "No embedding returned from model".to_string(),
                })
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            if texts.iter().any(|t| t.is_empty()) {
                return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
            }

            Self::run(
                "embed_batch",
                texts.iter().map(|s| (*s).to_string()).collect(),
            )
        }
    }
}

#[cfg(not(feature = "fastembed-embeddings"))]
mod fallback {
    use super::{DEFAULT_DIMENSIONS, Embedder, Error, Result};
    use crate::embedding::TokenHashEmbedder;

    /// `FastEmbed` embedder stand-in backed by [`TokenHashEmbedder`].
    ///
    /// Enable the `fastembed-embeddings` feature for semantic embeddings.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FastEmbedEmbedder {
        inner: TokenHashEmbedder,
    }

    impl FastEmbedEmbedder {
        /// Embedding dimensions of all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Creates a new embedder.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                inner: TokenHashEmbedder::new(),
            }
        }

        /// Returns the model name.
        #[must_use]
        pub const fn model_name(&self) -> &'static str {
            "token-hash"
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.is_empty() {
                return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
            }
            tracing::trace!("fastembed-embeddings disabled, using token-hash embedding");
            self.inner.embed(text)
        }
    }
}

#[cfg(feature = "fastembed-embeddings")]
pub use native::FastEmbedEmbedder;

#[cfg(not(feature = "fastembed-embeddings"))]
pub use fallback::FastEmbedEmbedder;
