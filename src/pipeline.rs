//! The embed-index-search workflow.
//!
//! This module ties the pieces together the way the review-search scripts
//! use them: read review rows from CSV, embed the text, define a collection
//! schema, build indexes, load, insert in chunks, flush, then answer
//! natural-language queries with ranked [`ReviewHit`]s.
//!
//! - [`ReviewIndexConfig`] names the collection and fields and carries the
//!   tuning knobs (index options, chunk sizes, conflict policy).
//! - [`ReviewIndexer`] runs the build side: schema, indexes, embedding,
//!   chunked inserts, flush.
//! - [`ReviewSearcher`] runs the query side: embed the query, search the
//!   dense (and for hybrid collections the sparse) vector field, fuse, and
//!   map hits to review metadata.
//! - [`FusionStrategy`] combines the two branches of a hybrid search.
//!
//! All handles are injected `Arc`s; nothing here holds global state.
//!
//! ```
//! use std::sync::Arc;
//!
//! use crocus::embedding::HashingTextEmbedder;
//! use crocus::pipeline::{ReviewIndexConfig, ReviewIndexer, ReviewRow, ReviewSearcher};
//! use crocus::store::MemoryStore;
//!
//! # async fn example() -> crocus::error::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let embedder = Arc::new(HashingTextEmbedder::with_dimension(64));
//! let config = ReviewIndexConfig::new("product_reviews");
//!
//! let indexer = ReviewIndexer::new(store.clone(), embedder.clone(), config.clone());
//! indexer
//!     .ingest(vec![ReviewRow {
//!         comment: "Quiet and powerful, highly recommended.".to_string(),
//!         rating: 5.0,
//!         product_id: 100,
//!     }])
//!     .await?;
//!
//! let searcher = ReviewSearcher::new(store, embedder, config);
//! let hits = searcher.search("powerful and quiet", 10).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod fusion;
pub mod ingest;
pub mod query;

pub use config::ReviewIndexConfig;
pub use dataset::{ReviewRow, read_reviews, read_reviews_from_reader};
pub use fusion::{FusionStrategy, SearchWeights};
pub use ingest::{IngestStats, ReviewIndexer};
pub use query::{ReviewHit, ReviewSearcher};

use crate::error::{CrocusError, Result};

/// Run a synchronous store call off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CrocusError::internal(format!("blocking task failed: {e}")))?
}
