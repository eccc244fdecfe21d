//! Vector collection store.
//!
//! A [`VectorStore`] manages named collections of schema-checked records with
//! dense and sparse vector fields, and answers top-k similarity searches over
//! them. The embedded implementation lives in [`memory`]; [`persist`] holds
//! its snapshot format.
//!
//! # Module Structure
//!
//! - [`memory`] - Embedded store implementation
//! - [`persist`] - JSON snapshot persistence
//!
//! # Collection Lifecycle
//!
//! A collection starts unloaded. Searching requires a prior [`VectorStore::load`];
//! inserted records become visible to search only after [`VectorStore::flush`].
//! A search therefore sees every previously flushed insert and nothing newer.

pub mod memory;
pub mod persist;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};
use crate::index::IndexOption;
use crate::record::{FieldValue, Record};
use crate::schema::CollectionSchema;
use crate::vector::{SparseVector, Vector};

pub use memory::MemoryStore;

fn default_search_limit() -> usize {
    10
}

/// Location of a store, parsed from a URI string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUri {
    /// Volatile in-memory store (`mem:`).
    Memory,
    /// File-backed store rooted at a directory.
    Path(PathBuf),
    /// A remote server. Recognized so the caller gets a clear rejection from
    /// the embedded engine instead of a path error.
    Remote(String),
}

impl StoreUri {
    /// Parse a store URI.
    ///
    /// `mem:` selects the volatile store; `http://`, `https://`, `grpc://`
    /// and `tcp://` URIs are classified as remote; anything else is treated
    /// as a filesystem directory.
    pub fn parse(uri: &str) -> Result<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(CrocusError::invalid_argument("store URI must not be empty"));
        }
        if trimmed == "mem:" || trimmed == "mem://" {
            return Ok(StoreUri::Memory);
        }
        for scheme in ["http://", "https://", "grpc://", "tcp://"] {
            if trimmed.starts_with(scheme) {
                return Ok(StoreUri::Remote(trimmed.to_string()));
            }
        }
        Ok(StoreUri::Path(PathBuf::from(trimmed)))
    }
}

/// Open a store from a URI string.
///
/// Remote URIs are rejected with [`CrocusError::ConnectionFailed`]; this
/// engine is embedded and does not speak to servers.
pub fn open_store(uri: &str) -> Result<Arc<dyn VectorStore>> {
    match StoreUri::parse(uri)? {
        StoreUri::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreUri::Path(path) => {
            let storage = Arc::new(crate::storage::FileStorage::new(&path)?);
            Ok(Arc::new(MemoryStore::open(storage)?))
        }
        StoreUri::Remote(uri) => {
            log::error!("cannot connect to remote store {}: embedded engine only", uri);
            Err(CrocusError::connection_failed(format!(
                "remote store not supported: {}",
                uri
            )))
        }
    }
}

/// Read visibility guarantee for a collection.
///
/// The embedded store gates visibility on `flush` for every level, which
/// satisfies `Strong`; the weaker levels exist so collection options survive
/// round trips with configs written for server deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// A search sees every previously flushed insert.
    #[default]
    Strong,
    /// Staleness bounded by a server-side window.
    Bounded,
    /// Reads within one session see that session's writes.
    Session,
    /// No visibility bound.
    Eventually,
}

/// What to do when `create_collection` finds the name already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the existing collection; fail with `SchemaConflict` if its schema
    /// is incompatible with the requested one.
    #[default]
    Error,
    /// Drop the existing collection and start empty. Destroys prior data.
    DropAndRecreate,
}

/// Options for `create_collection`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCollectionOptions {
    /// Read visibility guarantee.
    #[serde(default)]
    pub consistency_level: ConsistencyLevel,
    /// Conflict handling when the collection name already exists.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl CreateCollectionOptions {
    /// Create options with the defaults (`Strong`, `Error`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the consistency level.
    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = level;
        self
    }

    /// Set the conflict policy.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

/// Description of an existing collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// The schema the collection was created with.
    pub schema: CollectionSchema,
    /// Read visibility guarantee.
    pub consistency_level: ConsistencyLevel,
    /// Whether the collection is loaded for search.
    pub loaded: bool,
    /// Indexes by vector field name.
    pub indexes: HashMap<String, IndexOption>,
}

/// The vector to rank against in a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QueryVector {
    /// Dense query against a `FloatVector` field.
    Dense(Vector),
    /// Sparse query against a `SparseFloatVector` field.
    Sparse(SparseVector),
}

impl From<Vector> for QueryVector {
    fn from(v: Vector) -> Self {
        QueryVector::Dense(v)
    }
}

impl From<Vec<f32>> for QueryVector {
    fn from(v: Vec<f32>) -> Self {
        QueryVector::Dense(Vector::new(v))
    }
}

impl From<SparseVector> for QueryVector {
    fn from(v: SparseVector) -> Self {
        QueryVector::Sparse(v)
    }
}

/// Request model for a collection search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Collection to search.
    pub collection: String,
    /// Vector field to rank on.
    pub field: String,
    /// Query vector.
    pub query: QueryVector,
    /// Maximum number of results to return.
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    /// Optional scalar filter expression, e.g. `rating >= 4 and product_id != 0`.
    #[serde(default)]
    pub filter: Option<String>,
    /// Scalar fields to copy into each hit. `None` returns no extra fields.
    #[serde(default)]
    pub output_fields: Option<Vec<String>>,
    /// Search-time override of HNSW's `ef`. Unset falls back to the index
    /// value; the embedded store's exact scans do not consult it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ef: Option<usize>,
    /// Search-time override of IVF's `nprobe`. Unset falls back to the index
    /// value; the embedded store's exact scans do not consult it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nprobe: Option<usize>,
}

impl SearchRequest {
    /// Create a request with the default limit and no filter.
    pub fn new(
        collection: impl Into<String>,
        field: impl Into<String>,
        query: impl Into<QueryVector>,
    ) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
            query: query.into(),
            limit: default_search_limit(),
            filter: None,
            output_fields: None,
            ef: None,
            nprobe: None,
        }
    }

    /// Set the result limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Attach a scalar filter expression.
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    /// Select scalar fields to return with each hit.
    pub fn output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Override HNSW's `ef` for this search.
    pub fn ef(mut self, ef: usize) -> Self {
        self.ef = Some(ef);
        self
    }

    /// Override IVF's `nprobe` for this search.
    pub fn nprobe(mut self, nprobe: usize) -> Self {
        self.nprobe = Some(nprobe);
        self
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Primary key of the matched record.
    pub id: FieldValue,
    /// Similarity under the index metric; higher is closer. Identical
    /// vectors score 1.0 under every metric.
    pub score: f32,
    /// Raw distance under the index metric; lower is closer for L2 and
    /// cosine distance, negated dot product for inner product.
    pub distance: f32,
    /// Requested output fields.
    pub fields: HashMap<String, FieldValue>,
}

impl SearchHit {
    /// Get a returned scalar field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// A store of vector collections.
///
/// Implementations are internally synchronized; all methods take `&self` and
/// may be called from concurrent threads.
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Create a collection with the given schema.
    ///
    /// If the name exists, behavior follows `options.conflict_policy`: with
    /// [`ConflictPolicy::Error`] a schema-compatible existing collection is
    /// kept as-is and an incompatible one fails with `SchemaConflict`; with
    /// [`ConflictPolicy::DropAndRecreate`] the existing collection and all
    /// its rows are dropped first.
    fn create_collection(
        &self,
        name: &str,
        schema: CollectionSchema,
        options: CreateCollectionOptions,
    ) -> Result<()>;

    /// Drop a collection, removing its schema, indexes and rows.
    fn drop_collection(&self, name: &str) -> Result<()>;

    /// Check if a collection exists.
    fn has_collection(&self, name: &str) -> bool;

    /// List collection names.
    fn list_collections(&self) -> Vec<String>;

    /// Describe a collection.
    fn describe_collection(&self, name: &str) -> Result<CollectionInfo>;

    /// Create an index on a vector field.
    ///
    /// Dense index types require a `FloatVector` field;
    /// `SparseInvertedIndex` requires a `SparseFloatVector` field and the
    /// `Ip` metric.
    fn create_index(&self, collection: &str, field: &str, option: IndexOption) -> Result<()>;

    /// Load a collection for search.
    fn load(&self, collection: &str) -> Result<()>;

    /// Release a loaded collection. Subsequent searches fail until the next
    /// `load`; rows are kept.
    fn release(&self, collection: &str) -> Result<()>;

    /// Insert records, returning the number accepted.
    ///
    /// Records are validated against the schema. Inserted rows stay
    /// invisible to search until `flush`.
    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<usize>;

    /// Make previously inserted rows visible to search and durable for
    /// file-backed stores.
    fn flush(&self, collection: &str) -> Result<()>;

    /// Count flushed rows.
    fn num_entities(&self, collection: &str) -> Result<usize>;

    /// Run a top-k similarity search.
    ///
    /// Results are ordered by decreasing similarity and truncated to
    /// `request.limit`. Fails with `CollectionNotLoaded` if the collection
    /// was never loaded.
    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_uri_parse() {
        assert_eq!(StoreUri::parse("mem:").unwrap(), StoreUri::Memory);
        assert_eq!(StoreUri::parse(" mem: ").unwrap(), StoreUri::Memory);
        assert_eq!(
            StoreUri::parse("/tmp/reviews").unwrap(),
            StoreUri::Path(PathBuf::from("/tmp/reviews"))
        );
        assert_eq!(
            StoreUri::parse("http://localhost:19530").unwrap(),
            StoreUri::Remote("http://localhost:19530".to_string())
        );
        assert!(StoreUri::parse("").is_err());
    }

    #[test]
    fn test_open_store_rejects_remote() {
        let err = open_store("http://localhost:19530").unwrap_err();
        assert!(matches!(err, CrocusError::ConnectionFailed(_)));
    }

    #[test]
    fn test_search_request_builder() {
        let request = SearchRequest::new("reviews", "vector", vec![0.1, 0.2])
            .limit(3)
            .filter("rating >= 4")
            .output_fields(["comment", "rating"])
            .ef(128)
            .nprobe(16);

        assert_eq!(request.collection, "reviews");
        assert_eq!(request.limit, 3);
        assert_eq!(request.filter.as_deref(), Some("rating >= 4"));
        assert_eq!(
            request.output_fields,
            Some(vec!["comment".to_string(), "rating".to_string()])
        );
        assert_eq!(request.ef, Some(128));
        assert_eq!(request.nprobe, Some(16));
    }

    #[test]
    fn test_search_request_default_limit_on_deserialize() {
        let request: SearchRequest = serde_json::from_str(
            r#"{
                "collection": "reviews",
                "field": "vector",
                "query": {"type": "dense", "value": {"data": [0.0, 1.0]}}
            }"#,
        )
        .unwrap();
        assert_eq!(request.limit, 10);
        assert!(request.filter.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = CreateCollectionOptions::new()
            .consistency_level(ConsistencyLevel::Strong)
            .conflict_policy(ConflictPolicy::DropAndRecreate);
        assert_eq!(options.consistency_level, ConsistencyLevel::Strong);
        assert_eq!(options.conflict_policy, ConflictPolicy::DropAndRecreate);
    }
}
