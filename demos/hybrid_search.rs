//! Hybrid search: fuse sparse keyword matching with dense similarity
//!
//! This example shows how to:
//! 1. Configure a collection with both sparse and dense vector fields
//! 2. Ingest reviews through a sparse and a dense embedder
//! 3. Compare weighted-sum fusion with reciprocal rank fusion
//!
//! Run with: `cargo run --example hybrid_search`

mod common;

use std::sync::Arc;

use crocus::embedding::{HashingSparseEmbedder, HashingTextEmbedder};
use crocus::pipeline::{
    FusionStrategy, ReviewIndexConfig, ReviewIndexer, ReviewSearcher, SearchWeights,
};
use crocus::store::MemoryStore;

#[tokio::main]
async fn main() -> crocus::Result<()> {
    println!("=== Crocus Hybrid Search ===\n");

    // 1. A hybrid collection carries a sparse vector field next to the
    //    dense one; both get their own index
    let store = Arc::new(MemoryStore::new());
    let dense = Arc::new(HashingTextEmbedder::with_dimension(128));
    let sparse = Arc::new(HashingSparseEmbedder::new());
    let config = ReviewIndexConfig::new("product_reviews_hybrid").hybrid(true);

    // 2. Both embedders run at ingest time
    let indexer = ReviewIndexer::new(store.clone(), dense.clone(), config.clone())
        .with_sparse_embedder(sparse.clone());
    let stats = indexer.ingest(common::sample_reviews()).await?;
    println!("Indexed {} reviews.\n", stats.inserted);

    let searcher = ReviewSearcher::new(store, dense, config).with_sparse_embedder(sparse);

    // 3. Weighted sum is the default: sparse scores weighted 0.7, dense 1.0
    println!("[Weighted sum] 'kettle leaks':");
    let hits = searcher.search("kettle leaks", 3).await?;
    common::print_hits(&hits);

    // Reweight to emphasize exact keyword overlap
    println!("\n[Weighted sum, sparse-heavy] 'kettle leaks':");
    let hits = searcher
        .search_with_weights("kettle leaks", 3, SearchWeights::new(2.0, 0.5))
        .await?;
    common::print_hits(&hits);

    // 4. Reciprocal rank fusion ignores raw scores; only ranks count
    let searcher = searcher.with_fusion(FusionStrategy::Rrf { k: 60 });
    println!("\n[RRF] 'kettle leaks':");
    let hits = searcher.search("kettle leaks", 3).await?;
    common::print_hits(&hits);

    Ok(())
}
