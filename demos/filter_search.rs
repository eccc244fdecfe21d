//! Filter expressions: restrict similarity search with scalar predicates
//!
//! This example drops below the review pipeline to the store API and shows
//! how to:
//! 1. Define a collection schema with an explicit primary key and scalar fields
//! 2. Index records built by hand
//! 3. Search with a filter expression over the scalar fields
//!
//! Run with: `cargo run --example filter_search`

use crocus::embedding::{HashingTextEmbedder, TextEmbedder};
use crocus::index::HnswOption;
use crocus::record::Record;
use crocus::schema::{CollectionSchema, FieldSchema, FieldType};
use crocus::store::{CreateCollectionOptions, MemoryStore, SearchRequest, VectorStore};

#[tokio::main]
async fn main() -> crocus::Result<()> {
    println!("=== Crocus Filter Search ===\n");

    // 1. Schema: explicit integer primary key plus scalar metadata
    let schema = CollectionSchema::builder()
        .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
        .add_field(FieldSchema::new("title", FieldType::Varchar { max_length: 256 }))
        .add_field(FieldSchema::new("origin", FieldType::Varchar { max_length: 64 }))
        .add_field(FieldSchema::new("year", FieldType::Int64))
        .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 64 }))
        .build()?;

    let store = MemoryStore::new();
    store.create_collection("films", schema, CreateCollectionOptions::new())?;
    store.create_index("films", "vector", HnswOption::new().into())?;
    store.load("films")?;

    // 2. Index a few film summaries
    let embedder = HashingTextEmbedder::with_dimension(64);
    let films = [
        (1, "The Quiet Frontier", "American", 1952, "A retired marshal defends a railroad town from hired guns"),
        (2, "Chrome Horizon", "American", 1982, "A detective hunts a rogue android through a neon city"),
        (3, "Harvest of Stone", "French", 1959, "Two brothers fight over the family vineyard after the war"),
        (4, "The Last Signal", "American", 2014, "A lighthouse keeper intercepts a distress call decades old"),
        (5, "Paper Lanterns", "Japanese", 1967, "A street photographer documents a vanishing neighborhood"),
    ];

    let mut records = Vec::with_capacity(films.len());
    for (id, title, origin, year, summary) in films {
        let vector = embedder.embed(summary).await?;
        records.push(
            Record::new()
                .add_int64("id", id)
                .add_varchar("title", title)
                .add_varchar("origin", origin)
                .add_int64("year", year)
                .add_float_vector("vector", vector),
        );
    }
    store.insert("films", records)?;
    store.flush("films")?;
    println!("Indexed {} films.\n", films.len());

    // 3. Unfiltered search
    let query = embedder.embed("a lawman protects a small town").await?;
    let request = SearchRequest::new("films", "vector", query.clone())
        .limit(5)
        .output_fields(["title", "origin", "year"]);
    println!("[Search] 'a lawman protects a small town':");
    print_films(&store.search(&request)?);

    // 4. The same search restricted to postwar American films
    let request = SearchRequest::new("films", "vector", query)
        .limit(5)
        .filter(r#"origin == "American" and year > 1945 and year < 2000"#)
        .output_fields(["title", "origin", "year"]);
    println!("\n[Search] same query, origin == \"American\" and 1945 < year < 2000:");
    print_films(&store.search(&request)?);

    Ok(())
}

fn print_films(hits: &[crocus::store::SearchHit]) {
    if hits.is_empty() {
        println!("  (No results found)");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        let title = hit.field("title").and_then(|v| v.as_varchar()).unwrap_or("");
        let origin = hit.field("origin").and_then(|v| v.as_varchar()).unwrap_or("");
        let year = hit.field("year").and_then(|v| v.as_int64()).unwrap_or(0);
        println!(
            "  {}. {} ({}, {})  score {:.4}",
            i + 1,
            title,
            origin,
            year,
            hit.score
        );
    }
}
