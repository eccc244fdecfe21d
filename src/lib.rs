//! # Crocus
//!
//! An embedded vector search library for Rust: embed text into dense and
//! sparse vectors, index them in schema-checked collections, and serve top-k
//! similarity search.
//!
//! ## Features
//!
//! - Pure Rust, embedded: no vector database server to run
//! - Dense, sparse and hybrid (score-fused) similarity search
//! - Collections with typed schemas, vector indexes and a load/flush lifecycle
//! - Scalar filter expressions (`rating >= 4 and product_id != 0`)
//! - Pluggable text embedders, with optional BERT (candle) and OpenAI backends
//! - Volatile or file-backed stores behind one URI scheme
// Core modules
pub mod embedding;
pub mod error;
pub mod filter;
#[cfg(feature = "http")]
pub mod http;
pub mod index;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod storage;
pub mod store;
pub mod vector;

// Re-exports for the public API
#[cfg(feature = "embeddings-candle")]
pub use embedding::CandleTextEmbedder;
#[cfg(feature = "embeddings-openai")]
pub use embedding::OpenAITextEmbedder;
pub use embedding::{HashingSparseEmbedder, HashingTextEmbedder, SparseTextEmbedder, TextEmbedder};
pub use error::{CrocusError, Result};
pub use index::{
    AutoIndexOption, FlatOption, HnswOption, IndexOption, IndexType, IvfFlatOption,
    SparseInvertedIndexOption,
};
pub use pipeline::{
    FusionStrategy, IngestStats, ReviewHit, ReviewIndexConfig, ReviewIndexer, ReviewRow,
    ReviewSearcher, SearchWeights,
};
pub use record::{FieldValue, Record};
pub use schema::{CollectionSchema, FieldSchema, FieldType, SchemaBuilder};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{
    CollectionInfo, ConflictPolicy, ConsistencyLevel, CreateCollectionOptions, MemoryStore,
    QueryVector, SearchHit, SearchRequest, VectorStore, open_store,
};
pub use vector::{MetricType, SparseVector, Vector};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
