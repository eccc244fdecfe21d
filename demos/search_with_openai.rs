//! Semantic search with OpenAI embeddings
//!
//! Embeds reviews through the OpenAI embeddings API instead of a local
//! model. Requires an API key and network access.
//!
//! Run with:
//! `OPENAI_API_KEY=sk-... cargo run --example search_with_openai --features embeddings-openai`

mod common;

use std::sync::Arc;

use crocus::embedding::OpenAITextEmbedder;
use crocus::pipeline::{ReviewIndexConfig, ReviewIndexer, ReviewSearcher};
use crocus::store::MemoryStore;

#[tokio::main]
async fn main() -> crocus::Result<()> {
    println!("=== Crocus Semantic Search (OpenAI) ===\n");

    let Ok(api_key) = std::env::var("OPENAI_API_KEY") else {
        eprintln!("Set OPENAI_API_KEY to run this example.");
        return Ok(());
    };

    // 1. The embedder batches rows into single API calls during ingest
    let embedder = Arc::new(OpenAITextEmbedder::new(
        api_key,
        "text-embedding-3-small".to_string(),
    )?);
    let store = Arc::new(MemoryStore::new());
    let config = ReviewIndexConfig::new("product_reviews");

    // 2. Ingest
    let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
    let stats = indexer.ingest(common::sample_reviews()).await?;
    println!("Indexed {} reviews.\n", stats.inserted);

    // 3. Queries that match by meaning rather than by shared words
    let searcher = ReviewSearcher::new(store, embedder, config);

    println!("[Search] 'is it noisy':");
    let hits = searcher.search("is it noisy", 3).await?;
    common::print_hits(&hits);

    println!("\n[Search] 'broke right away':");
    let hits = searcher.search("broke right away", 3).await?;
    common::print_hits(&hits);

    Ok(())
}
