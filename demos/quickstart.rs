//! Quickstart: your first review search with Crocus
//!
//! This minimal example shows how to:
//! 1. Create an in-memory vector store
//! 2. Ingest product reviews with the built-in hashing embedder
//! 3. Search with natural-language queries
//!
//! Run with: `cargo run --example quickstart`

mod common;

use std::sync::Arc;

use crocus::embedding::HashingTextEmbedder;
use crocus::pipeline::{ReviewIndexConfig, ReviewIndexer, ReviewSearcher};
use crocus::store::MemoryStore;

#[tokio::main]
async fn main() -> crocus::Result<()> {
    println!("=== Crocus Quickstart ===\n");

    // 1. Create a store and the embedder both sides share
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(HashingTextEmbedder::with_dimension(128));
    let config = ReviewIndexConfig::new("product_reviews");

    // 2. Ingest reviews; this creates the collection, indexes the dense
    //    vector field and loads it for search
    let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
    let stats = indexer.ingest(common::sample_reviews()).await?;
    println!("Indexed {} reviews.\n", stats.inserted);

    // 3. Search
    let searcher = ReviewSearcher::new(store, embedder, config);

    println!("[Search] 'battery life':");
    let hits = searcher.search("battery life", 3).await?;
    common::print_hits(&hits);

    println!("\n[Search] 'leaks water':");
    let hits = searcher.search("leaks water", 3).await?;
    common::print_hits(&hits);

    Ok(())
}
