//! Dense text embedding trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Vector;

/// Trait for converting text to dense vector embeddings.
///
/// Implementations must be `Send + Sync`; the pipeline shares them across
/// tasks behind an `Arc`. Every vector an embedder returns has
/// [`dimension`](TextEmbedder::dimension) entries.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts.
    ///
    /// The default implementation calls `embed` sequentially; embedders with
    /// real batch support (API calls, batched model forward passes) override
    /// it. The result always has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Get the dimension of generated embeddings.
    fn dimension(&self) -> usize;

    /// Get the name/identifier of this embedder, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
