//! Natural-language review search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::embedding::{SparseTextEmbedder, TextEmbedder};
use crate::error::{CrocusError, Result};
use crate::store::{QueryVector, SearchHit, SearchRequest, VectorStore};

use super::config::ReviewIndexConfig;
use super::fusion::{FusionStrategy, SearchWeights};
use super::run_blocking;

/// One ranked review returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewHit {
    /// Review text.
    pub comment: String,
    /// Star rating.
    pub rating: f32,
    /// Reviewed product id.
    pub product_id: i64,
    /// Similarity to the query; higher is closer.
    pub similarity: f32,
}

/// Answers natural-language queries against an ingested review collection.
///
/// The searcher embeds the query with the same embedders the collection was
/// built with, searches the dense vector field (and, for hybrid collections,
/// the sparse field too), fuses the branches, and maps hits back to review
/// metadata. All handles are injected; the searcher holds no connection
/// state of its own.
#[derive(Clone)]
pub struct ReviewSearcher {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn TextEmbedder>,
    sparse_embedder: Option<Arc<dyn SparseTextEmbedder>>,
    config: ReviewIndexConfig,
    fusion: FusionStrategy,
}

impl ReviewSearcher {
    /// Create a searcher over the collection described by `config`.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn TextEmbedder>,
        config: ReviewIndexConfig,
    ) -> Self {
        ReviewSearcher {
            store,
            embedder,
            sparse_embedder: None,
            config,
            fusion: FusionStrategy::default(),
        }
    }

    /// Attach the sparse embedder; required for hybrid collections.
    pub fn with_sparse_embedder(mut self, embedder: Arc<dyn SparseTextEmbedder>) -> Self {
        self.sparse_embedder = Some(embedder);
        self
    }

    /// Replace the fusion strategy used for hybrid collections.
    pub fn with_fusion(mut self, fusion: FusionStrategy) -> Self {
        self.fusion = fusion;
        self
    }

    /// Search with the default branch weights.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<ReviewHit>> {
        self.run(query, limit, SearchWeights::default(), None).await
    }

    /// Search with explicit branch weights (hybrid collections only; the
    /// weights are ignored for dense-only collections and rank-based fusion).
    pub async fn search_with_weights(
        &self,
        query: &str,
        limit: usize,
        weights: SearchWeights,
    ) -> Result<Vec<ReviewHit>> {
        self.run(query, limit, weights, None).await
    }

    /// Search with a scalar filter expression restricting the candidates,
    /// e.g. `rating >= 4 and product_id != 0`.
    pub async fn search_filtered(
        &self,
        query: &str,
        limit: usize,
        filter: &str,
    ) -> Result<Vec<ReviewHit>> {
        self.run(query, limit, SearchWeights::default(), Some(filter))
            .await
    }

    async fn run(
        &self,
        query: &str,
        limit: usize,
        weights: SearchWeights,
        filter: Option<&str>,
    ) -> Result<Vec<ReviewHit>> {
        let dense = self.embedder.embed(query).await?;
        let dense_request = self.request(&self.config.dense_field, dense.into(), limit, filter);

        let hits = if self.config.hybrid {
            let sparse_embedder = self.sparse_embedder.as_ref().ok_or_else(|| {
                CrocusError::invalid_argument(
                    "hybrid collections need a sparse embedder; call with_sparse_embedder",
                )
            })?;
            let sparse = sparse_embedder.embed(query).await?;
            let sparse_request =
                self.request(&self.config.sparse_field, sparse.into(), limit, filter);

            let store = Arc::clone(&self.store);
            let sparse_hits = run_blocking(move || store.search(&sparse_request)).await?;
            let store = Arc::clone(&self.store);
            let dense_hits = run_blocking(move || store.search(&dense_request)).await?;
            self.fusion.fuse(sparse_hits, dense_hits, weights, limit)
        } else {
            let store = Arc::clone(&self.store);
            run_blocking(move || store.search(&dense_request)).await?
        };

        Ok(hits.into_iter().map(|hit| self.to_review_hit(hit)).collect())
    }

    fn request(
        &self,
        field: &str,
        query: QueryVector,
        limit: usize,
        filter: Option<&str>,
    ) -> SearchRequest {
        let mut request = SearchRequest::new(&self.config.collection, field, query)
            .limit(limit)
            .output_fields(self.config.output_fields());
        if let Some(expr) = filter {
            request = request.filter(expr);
        }
        request
    }

    fn to_review_hit(&self, hit: SearchHit) -> ReviewHit {
        let comment = hit
            .field(&self.config.text_field)
            .and_then(|v| v.as_varchar())
            .unwrap_or_default()
            .to_string();
        let rating = hit
            .field(&self.config.rating_field)
            .and_then(|v| v.as_float())
            .unwrap_or(0.0);
        let product_id = hit
            .field(&self.config.product_id_field)
            .and_then(|v| v.as_int64())
            .unwrap_or(0);
        ReviewHit {
            comment,
            rating,
            product_id,
            similarity: hit.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{HashingSparseEmbedder, HashingTextEmbedder};
    use crate::pipeline::dataset::ReviewRow;
    use crate::pipeline::ingest::ReviewIndexer;
    use crate::store::MemoryStore;

    fn sample_rows() -> Vec<ReviewRow> {
        vec![
            ReviewRow {
                comment: "Absolutely love this blender, quiet and powerful.".to_string(),
                rating: 5.0,
                product_id: 100,
            },
            ReviewRow {
                comment: "The kettle leaks from the lid after a week.".to_string(),
                rating: 1.0,
                product_id: 200,
            },
            ReviewRow {
                comment: "Decent toaster for the price, a bit slow.".to_string(),
                rating: 3.0,
                product_id: 300,
            },
        ]
    }

    async fn dense_fixture() -> (Arc<MemoryStore>, Arc<HashingTextEmbedder>, ReviewIndexConfig) {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
        let config = ReviewIndexConfig::new("reviews");
        let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
        indexer.ingest(sample_rows()).await.unwrap();
        (store, embedder, config)
    }

    #[tokio::test]
    async fn test_search_returns_best_match() {
        let (store, embedder, config) = dense_fixture().await;
        let searcher = ReviewSearcher::new(store, embedder, config);

        let hits = searcher
            .search("The kettle leaks from the lid after a week.", 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].product_id, 200);
        assert_eq!(hits[0].rating, 1.0);
        assert!((hits[0].similarity - 1.0).abs() < 1e-4);
        assert!(hits[0].similarity >= hits[1].similarity);
        assert!(hits[1].similarity >= hits[2].similarity);
    }

    #[tokio::test]
    async fn test_limit_caps_results() {
        let (store, embedder, config) = dense_fixture().await;
        let searcher = ReviewSearcher::new(store, embedder, config);

        let hits = searcher.search("quiet blender", 2).await.unwrap();
        assert!(hits.len() <= 2);
    }

    #[tokio::test]
    async fn test_filtered_search() {
        let (store, embedder, config) = dense_fixture().await;
        let searcher = ReviewSearcher::new(store, embedder, config);

        let hits = searcher
            .search_filtered("kitchen appliance", 10, "rating >= 3")
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.rating >= 3.0));

        let none = searcher
            .search_filtered("kitchen appliance", 10, "product_id == 999")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_bad_filter_is_an_error() {
        let (store, embedder, config) = dense_fixture().await;
        let searcher = ReviewSearcher::new(store, embedder, config);

        assert!(
            searcher
                .search_filtered("anything", 10, "rating >=")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_search_missing_collection() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
        let searcher = ReviewSearcher::new(store, embedder, ReviewIndexConfig::new("nothing"));

        let result = searcher.search("anything at all", 5).await;
        assert!(matches!(result, Err(CrocusError::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_hybrid_search_fuses_branches() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
        let sparse = Arc::new(HashingSparseEmbedder::new());
        let config = ReviewIndexConfig::new("reviews_hybrid").hybrid(true);

        let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone())
            .with_sparse_embedder(sparse.clone());
        indexer.ingest(sample_rows()).await.unwrap();

        let searcher = ReviewSearcher::new(store, embedder, config).with_sparse_embedder(sparse);

        let hits = searcher
            .search("Decent toaster for the price, a bit slow.", 10)
            .await
            .unwrap();
        assert_eq!(hits[0].product_id, 300);
        // Both branches score the exact text 1.0: 0.7 sparse + 1.0 dense.
        assert!((hits[0].similarity - 1.7).abs() < 1e-4);

        let rrf_hits = searcher
            .with_fusion(FusionStrategy::Rrf { k: 60 })
            .search("Decent toaster for the price, a bit slow.", 10)
            .await
            .unwrap();
        assert_eq!(rrf_hits[0].product_id, 300);
    }

    #[tokio::test]
    async fn test_hybrid_weights() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
        let sparse = Arc::new(HashingSparseEmbedder::new());
        let config = ReviewIndexConfig::new("reviews_weights").hybrid(true);

        let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone())
            .with_sparse_embedder(sparse.clone());
        indexer.ingest(sample_rows()).await.unwrap();

        let searcher = ReviewSearcher::new(store, embedder, config).with_sparse_embedder(sparse);

        let hits = searcher
            .search_with_weights(
                "Absolutely love this blender, quiet and powerful.",
                10,
                SearchWeights::new(0.0, 1.0),
            )
            .await
            .unwrap();
        // Dense-only weighting still ranks the exact text first.
        assert_eq!(hits[0].product_id, 100);
        assert!((hits[0].similarity - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_hybrid_requires_sparse_embedder() {
        let store = Arc::new(MemoryStore::new());
        let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
        let config = ReviewIndexConfig::new("reviews_h").hybrid(true);
        let searcher = ReviewSearcher::new(store, embedder, config);

        assert!(searcher.search("anything", 5).await.is_err());
    }
}
