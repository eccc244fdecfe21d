//! Scalar filter expressions applied to similarity search.

use crocus::CrocusError;
use crocus::embedding::{HashingTextEmbedder, TextEmbedder};
use crocus::index::HnswOption;
use crocus::record::Record;
use crocus::schema::{CollectionSchema, FieldSchema, FieldType};
use crocus::store::{
    CreateCollectionOptions, MemoryStore, SearchRequest, VectorStore,
};

const FILMS: [(i64, &str, &str, i64); 5] = [
    (1, "The Quiet Frontier", "American", 1952),
    (2, "Chrome Horizon", "American", 1982),
    (3, "Harvest of Stone", "French", 1959),
    (4, "The Last Signal", "American", 2014),
    (5, "Paper Lanterns", "Japanese", 1967),
];

async fn film_store() -> (MemoryStore, HashingTextEmbedder) {
    let schema = CollectionSchema::builder()
        .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
        .add_field(FieldSchema::new("title", FieldType::Varchar { max_length: 256 }))
        .add_field(FieldSchema::new("origin", FieldType::Varchar { max_length: 64 }))
        .add_field(FieldSchema::new("year", FieldType::Int64))
        .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 32 }))
        .build()
        .unwrap();

    let store = MemoryStore::new();
    store
        .create_collection("films", schema, CreateCollectionOptions::new())
        .unwrap();
    store
        .create_index("films", "vector", HnswOption::new().into())
        .unwrap();
    store.load("films").unwrap();

    let embedder = HashingTextEmbedder::with_dimension(32);
    let mut records = Vec::new();
    for (id, title, origin, year) in FILMS {
        let vector = embedder.embed(title).await.unwrap();
        records.push(
            Record::new()
                .add_int64("id", id)
                .add_varchar("title", title)
                .add_varchar("origin", origin)
                .add_int64("year", year)
                .add_float_vector("vector", vector),
        );
    }
    store.insert("films", records).unwrap();
    store.flush("films").unwrap();
    (store, embedder)
}

#[tokio::test]
async fn test_conjunctive_filter_restricts_results() {
    let (store, embedder) = film_store().await;
    let query = embedder.embed("frontier town").await.unwrap();

    let request = SearchRequest::new("films", "vector", query)
        .limit(10)
        .filter(r#"origin == "American" and year > 1945 and year < 2000"#)
        .output_fields(["title", "origin", "year"]);
    let hits = store.search(&request).unwrap();

    // Only the two postwar American films qualify
    assert_eq!(hits.len(), 2);
    for hit in &hits {
        assert_eq!(hit.field("origin").and_then(|v| v.as_varchar()), Some("American"));
        let year = hit.field("year").and_then(|v| v.as_int64()).unwrap();
        assert!(year > 1945 && year < 2000);
    }
}

#[tokio::test]
async fn test_in_list_filter() {
    let (store, embedder) = film_store().await;
    let query = embedder.embed("stone harvest").await.unwrap();

    let request = SearchRequest::new("films", "vector", query)
        .limit(10)
        .filter(r#"origin in ["French", "Japanese"]"#)
        .output_fields(["origin"]);
    let hits = store.search(&request).unwrap();

    assert_eq!(hits.len(), 2);
    for hit in &hits {
        let origin = hit.field("origin").and_then(|v| v.as_varchar()).unwrap();
        assert!(origin == "French" || origin == "Japanese");
    }
}

#[tokio::test]
async fn test_filter_matching_nothing_returns_empty() {
    let (store, embedder) = film_store().await;
    let query = embedder.embed("anything").await.unwrap();

    let request = SearchRequest::new("films", "vector", query)
        .limit(10)
        .filter("year > 2100");
    assert!(store.search(&request).unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_filter_is_a_parse_error() {
    let (store, embedder) = film_store().await;
    let query = embedder.embed("anything").await.unwrap();

    let request = SearchRequest::new("films", "vector", query)
        .limit(10)
        .filter("year >");
    let result = store.search(&request);
    assert!(matches!(result, Err(CrocusError::Parse(_))));
}
