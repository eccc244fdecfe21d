//! Sparse text embedding trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::SparseVector;

/// Trait for converting text to sparse term-weight embeddings.
///
/// Sparse embeddings map tokens to (term index, weight) pairs and pair with
/// an inner-product sparse index for lexical-style matching alongside dense
/// similarity.
#[async_trait]
pub trait SparseTextEmbedder: Send + Sync {
    /// Generate a sparse embedding for the given text.
    async fn embed(&self, text: &str) -> Result<SparseVector>;

    /// Generate sparse embeddings for multiple texts.
    ///
    /// The default implementation calls `embed` sequentially. The result
    /// always has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<SparseVector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Get the name/identifier of this embedder, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
