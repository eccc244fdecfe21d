//! Semantic search with a sentence-transformer model on candle
//!
//! The hashing embedder in the other examples only matches overlapping
//! words. This example embeds reviews with
//! `sentence-transformers/all-MiniLM-L6-v2` running locally, so queries
//! match by meaning. The first run downloads the model from Hugging Face.
//!
//! Run with:
//! `cargo run --example search_with_candle --features embeddings-candle`

mod common;

use std::sync::Arc;

use crocus::embedding::{CandleTextEmbedder, DEFAULT_CANDLE_MODEL, TextEmbedder};
use crocus::pipeline::{ReviewIndexConfig, ReviewIndexer, ReviewSearcher};
use crocus::store::MemoryStore;

#[tokio::main]
async fn main() -> crocus::Result<()> {
    println!("=== Crocus Semantic Search (candle) ===\n");

    // 1. Load the model; its hidden size becomes the dense dimension
    println!("Loading {}...", DEFAULT_CANDLE_MODEL);
    let embedder = Arc::new(CandleTextEmbedder::new(DEFAULT_CANDLE_MODEL)?);
    println!("Model loaded, dimension {}.\n", embedder.dimension());

    let store = Arc::new(MemoryStore::new());
    let config = ReviewIndexConfig::new("product_reviews");

    // 2. Ingest
    let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
    let stats = indexer.ingest(common::sample_reviews()).await?;
    println!("Indexed {} reviews.\n", stats.inserted);

    // 3. Queries that share no words with the reviews they should find
    let searcher = ReviewSearcher::new(store, embedder, config);

    println!("[Search] 'is it noisy':");
    let hits = searcher.search("is it noisy", 3).await?;
    common::print_hits(&hits);

    println!("\n[Search] 'broke right away':");
    let hits = searcher.search("broke right away", 3).await?;
    common::print_hits(&hits);

    Ok(())
}
