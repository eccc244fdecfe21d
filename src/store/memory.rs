//! Embedded vector store implementation.
//!
//! Collections live in memory behind per-collection locks. With a storage
//! backend attached, flushed state is additionally written out as JSON
//! snapshots and restored on reopen. Searches are exact scans over the
//! flushed rows; index options are validated and persisted, and their metric
//! drives scoring, but no approximate structure is built.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use uuid::Uuid;

use crate::error::{CrocusError, Result};
use crate::filter::FilterExpr;
use crate::index::IndexOption;
use crate::record::{FieldValue, Record};
use crate::schema::{CollectionSchema, FieldType};
use crate::storage::Storage;
use crate::store::persist::{self, CollectionMeta};
use crate::store::{
    CollectionInfo, ConflictPolicy, ConsistencyLevel, CreateCollectionOptions, QueryVector,
    SearchHit, SearchRequest, VectorStore,
};
use crate::vector::MetricType;

/// Row count above which a search scan runs on the rayon pool.
const PARALLEL_SCAN_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Collection {
    name: String,
    schema: CollectionSchema,
    consistency_level: ConsistencyLevel,
    /// Indexes by vector field name.
    indexes: HashMap<String, IndexOption>,
    /// Whether the collection is loaded for search.
    loaded: bool,
    /// Next value for an Int64 auto-id primary key.
    next_auto_id: i64,
    /// Inserted rows awaiting flush; invisible to search.
    pending: Vec<Record>,
    /// Flushed rows; the search scan runs over these.
    visible: Vec<Record>,
}

impl Collection {
    fn new(name: &str, schema: CollectionSchema, options: &CreateCollectionOptions) -> Self {
        Collection {
            name: name.to_string(),
            schema,
            consistency_level: options.consistency_level,
            indexes: HashMap::new(),
            loaded: false,
            next_auto_id: 0,
            pending: Vec::new(),
            visible: Vec::new(),
        }
    }

    fn meta(&self) -> CollectionMeta {
        CollectionMeta {
            name: self.name.clone(),
            schema: self.schema.clone(),
            consistency_level: self.consistency_level,
            indexes: self.indexes.clone(),
            next_auto_id: self.next_auto_id,
        }
    }
}

/// The embedded [`VectorStore`].
///
/// `MemoryStore::new()` gives a volatile store; [`MemoryStore::open`]
/// attaches a storage backend and restores any collections persisted there.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<RwLock<Collection>>>>,
    storage: Option<Arc<dyn Storage>>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.collections.read().len())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a volatile store.
    pub fn new() -> Self {
        MemoryStore {
            collections: RwLock::new(HashMap::new()),
            storage: None,
        }
    }

    /// Open a store over a storage backend, restoring persisted collections.
    ///
    /// Restored collections come back unloaded; callers re-run `load` before
    /// searching, mirroring a fresh deployment.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let mut collections = HashMap::new();
        if let Some(manifest) = persist::load_manifest(storage.as_ref())? {
            for name in &manifest.collections {
                let (meta, rows) = persist::load_collection(storage.as_ref(), name)?;
                let collection = Collection {
                    name: meta.name,
                    schema: meta.schema,
                    consistency_level: meta.consistency_level,
                    indexes: meta.indexes,
                    loaded: false,
                    next_auto_id: meta.next_auto_id,
                    pending: Vec::new(),
                    visible: rows,
                };
                collections.insert(name.clone(), Arc::new(RwLock::new(collection)));
            }
            log::info!("opened store with {} collections", collections.len());
        }
        Ok(MemoryStore {
            collections: RwLock::new(collections),
            storage: Some(storage),
        })
    }

    fn collection(&self, name: &str) -> Result<Arc<RwLock<Collection>>> {
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CrocusError::collection_not_found(name))
    }

    fn save_manifest(&self, collections: &HashMap<String, Arc<RwLock<Collection>>>) -> Result<()> {
        if let Some(storage) = &self.storage {
            let mut names: Vec<String> = collections.keys().cloned().collect();
            names.sort();
            persist::save_manifest(storage.as_ref(), names)?;
        }
        Ok(())
    }

    fn save_collection(&self, collection: &Collection) -> Result<()> {
        if let Some(storage) = &self.storage {
            persist::save_collection(storage.as_ref(), &collection.meta(), &collection.visible)?;
        }
        Ok(())
    }
}

impl VectorStore for MemoryStore {
    fn create_collection(
        &self,
        name: &str,
        schema: CollectionSchema,
        options: CreateCollectionOptions,
    ) -> Result<()> {
        check_collection_name(name)?;

        let mut collections = self.collections.write();
        if let Some(existing) = collections.get(name) {
            match options.conflict_policy {
                ConflictPolicy::Error => {
                    let existing = existing.read();
                    if existing.schema.is_compatible(&schema) {
                        log::debug!("collection {} already exists with a compatible schema", name);
                        return Ok(());
                    }
                    return Err(CrocusError::schema_conflict(format!(
                        "collection {} already exists with an incompatible schema",
                        name
                    )));
                }
                ConflictPolicy::DropAndRecreate => {
                    log::warn!(
                        "dropping existing collection {} and discarding its rows",
                        name
                    );
                    collections.remove(name);
                    if let Some(storage) = &self.storage {
                        persist::delete_collection(storage.as_ref(), name)?;
                    }
                }
            }
        }

        let collection = Collection::new(name, schema, &options);
        self.save_collection(&collection)?;
        collections.insert(name.to_string(), Arc::new(RwLock::new(collection)));
        self.save_manifest(&collections)?;
        log::info!("created collection {}", name);
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.remove(name).is_none() {
            return Err(CrocusError::collection_not_found(name));
        }
        if let Some(storage) = &self.storage {
            persist::delete_collection(storage.as_ref(), name)?;
        }
        self.save_manifest(&collections)?;
        log::info!("dropped collection {}", name);
        Ok(())
    }

    fn has_collection(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn describe_collection(&self, name: &str) -> Result<CollectionInfo> {
        let collection = self.collection(name)?;
        let collection = collection.read();
        Ok(CollectionInfo {
            name: collection.name.clone(),
            schema: collection.schema.clone(),
            consistency_level: collection.consistency_level,
            loaded: collection.loaded,
            indexes: collection.indexes.clone(),
        })
    }

    fn create_index(&self, collection: &str, field: &str, option: IndexOption) -> Result<()> {
        let handle = self.collection(collection)?;
        let mut col = handle.write();

        let field_schema = col.schema.field(field).ok_or_else(|| {
            CrocusError::index(format!(
                "collection {} has no field named {}",
                collection, field
            ))
        })?;

        match (&field_schema.field_type, option.index_type().is_sparse()) {
            (FieldType::FloatVector { .. }, false) => {}
            (FieldType::SparseFloatVector, true) => {
                if option.metric() != MetricType::Ip {
                    return Err(CrocusError::index(format!(
                        "sparse index on field {} supports only the IP metric",
                        field
                    )));
                }
            }
            (FieldType::FloatVector { .. }, true) => {
                return Err(CrocusError::index(format!(
                    "{} cannot be built on dense field {}",
                    option.index_type().as_str(),
                    field
                )));
            }
            (FieldType::SparseFloatVector, false) => {
                return Err(CrocusError::index(format!(
                    "{} cannot be built on sparse field {}",
                    option.index_type().as_str(),
                    field
                )));
            }
            _ => {
                return Err(CrocusError::index(format!(
                    "field {} is not a vector field",
                    field
                )));
            }
        }

        log::debug!(
            "created {} index on {}.{}",
            option.index_type().as_str(),
            collection,
            field
        );
        col.indexes.insert(field.to_string(), option);
        self.save_collection(&col)?;
        Ok(())
    }

    fn load(&self, collection: &str) -> Result<()> {
        let handle = self.collection(collection)?;
        let mut col = handle.write();

        for field in col.schema.vector_fields() {
            if !col.indexes.contains_key(&field.name) {
                return Err(CrocusError::index(format!(
                    "vector field {} has no index; create an index before loading",
                    field.name
                )));
            }
        }
        col.loaded = true;
        log::debug!("loaded collection {}", collection);
        Ok(())
    }

    fn release(&self, collection: &str) -> Result<()> {
        let handle = self.collection(collection)?;
        handle.write().loaded = false;
        Ok(())
    }

    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let handle = self.collection(collection)?;
        let mut col = handle.write();

        for record in &records {
            col.schema.validate_record(record)?;
        }

        let primary = col.schema.primary_field().clone();
        let count = records.len();
        for mut record in records {
            if primary.auto_id {
                let id = match primary.field_type {
                    FieldType::Int64 => {
                        let id = col.next_auto_id;
                        col.next_auto_id += 1;
                        FieldValue::Int64(id)
                    }
                    // Schema validation restricts auto-id keys to Int64 and
                    // Varchar.
                    _ => FieldValue::Varchar(Uuid::new_v4().to_string()),
                };
                record.set_field(primary.name.clone(), id);
            }
            col.pending.push(record);
        }
        Ok(count)
    }

    fn flush(&self, collection: &str) -> Result<()> {
        let handle = self.collection(collection)?;
        let mut col = handle.write();

        let pending = std::mem::take(&mut col.pending);
        let flushed = pending.len();
        col.visible.extend(pending);
        self.save_collection(&col)?;
        if let Some(storage) = &self.storage {
            storage.sync()?;
        }
        log::debug!(
            "flushed {} rows to {} ({} visible)",
            flushed,
            collection,
            col.visible.len()
        );
        Ok(())
    }

    fn num_entities(&self, collection: &str) -> Result<usize> {
        let handle = self.collection(collection)?;
        let count = handle.read().visible.len();
        Ok(count)
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let handle = self.collection(&request.collection)?;
        let col = handle.read();

        if !col.loaded {
            return Err(CrocusError::collection_not_loaded(&request.collection));
        }

        let field_schema = col.schema.field(&request.field).ok_or_else(|| {
            CrocusError::invalid_argument(format!(
                "collection {} has no field named {}",
                request.collection, request.field
            ))
        })?;
        match (&request.query, &field_schema.field_type) {
            (QueryVector::Dense(query), FieldType::FloatVector { dim }) => {
                query.validate_dimension(*dim)?;
            }
            (QueryVector::Sparse(_), FieldType::SparseFloatVector) => {}
            (QueryVector::Sparse(_), FieldType::FloatVector { .. }) => {
                return Err(CrocusError::invalid_argument(format!(
                    "field {} is dense; search it with a dense query vector",
                    request.field
                )));
            }
            (QueryVector::Dense(_), FieldType::SparseFloatVector) => {
                return Err(CrocusError::invalid_argument(format!(
                    "field {} is sparse; search it with a sparse query vector",
                    request.field
                )));
            }
            _ => {
                return Err(CrocusError::invalid_argument(format!(
                    "field {} is not a vector field",
                    request.field
                )));
            }
        }

        let metric = col
            .indexes
            .get(&request.field)
            .map(|option| option.metric())
            .ok_or_else(|| {
                CrocusError::index(format!("field {} has no index", request.field))
            })?;

        let filter = match &request.filter {
            Some(expr) => {
                let parsed = FilterExpr::parse(expr)?;
                parsed.validate(&col.schema)?;
                Some(parsed)
            }
            None => None,
        };

        if let Some(names) = &request.output_fields {
            for name in names {
                if col.schema.field(name).is_none() && !col.schema.dynamic_fields_enabled() {
                    return Err(CrocusError::invalid_argument(format!(
                        "unknown output field {}",
                        name
                    )));
                }
            }
        }

        let rows = &col.visible;
        let mut scored: Vec<ScoredRow<'_>> = if rows.len() < PARALLEL_SCAN_THRESHOLD {
            rows.iter()
                .filter_map(|r| score_row(r, &request.field, &request.query, metric, filter.as_ref()))
                .collect()
        } else {
            rows.par_iter()
                .filter_map(|r| score_row(r, &request.field, &request.query, metric, filter.as_ref()))
                .collect()
        };

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(request.limit);

        let primary_name = &col.schema.primary_field().name;
        let mut hits = Vec::with_capacity(scored.len());
        for row in scored {
            let id = row
                .record
                .get(primary_name)
                .cloned()
                .unwrap_or(FieldValue::Null);
            let mut fields = HashMap::new();
            if let Some(names) = &request.output_fields {
                for name in names {
                    if let Some(value) = row.record.get(name) {
                        fields.insert(name.clone(), value.clone());
                    }
                }
            }
            hits.push(SearchHit {
                id,
                score: row.score,
                distance: row.distance,
                fields,
            });
        }
        Ok(hits)
    }
}

struct ScoredRow<'a> {
    record: &'a Record,
    score: f32,
    distance: f32,
}

fn score_row<'a>(
    record: &'a Record,
    field: &str,
    query: &QueryVector,
    metric: MetricType,
    filter: Option<&FilterExpr>,
) -> Option<ScoredRow<'a>> {
    if let Some(filter) = filter
        && !filter.matches(record)
    {
        return None;
    }
    let (score, distance) = match (query, record.get(field)) {
        (QueryVector::Dense(q), Some(FieldValue::FloatVector(v))) => {
            let score = metric.similarity(q.as_slice(), v.as_slice()).ok()?;
            let distance = metric.distance(q.as_slice(), v.as_slice()).ok()?;
            (score, distance)
        }
        (QueryVector::Sparse(q), Some(FieldValue::SparseFloatVector(v))) => {
            let dot = q.dot(v);
            (dot, -dot)
        }
        _ => return None,
    };
    Some(ScoredRow {
        record,
        score,
        distance,
    })
}

fn check_collection_name(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(CrocusError::invalid_argument(
            "collection name must not be empty",
        ));
    };
    if first.is_ascii_digit() {
        return Err(CrocusError::invalid_argument(format!(
            "collection name must not start with a digit: {}",
            name
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CrocusError::invalid_argument(format!(
            "collection name may contain only letters, digits and underscores: {}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatOption, HnswOption, SparseInvertedIndexOption};
    use crate::schema::FieldSchema;
    use crate::vector::{SparseVector, Vector};

    fn review_schema(dim: usize) -> CollectionSchema {
        CollectionSchema::builder()
            .add_field(
                FieldSchema::new("id", FieldType::Varchar { max_length: 100 })
                    .primary_key()
                    .auto_id(),
            )
            .add_field(FieldSchema::new(
                "comment",
                FieldType::Varchar { max_length: 65535 },
            ))
            .add_field(FieldSchema::new("rating", FieldType::Float))
            .add_field(FieldSchema::new("product_id", FieldType::Int64))
            .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim }))
            .build()
            .unwrap()
    }

    fn review(comment: &str, rating: f32, product_id: i64, vector: Vec<f32>) -> Record {
        Record::new()
            .add_varchar("comment", comment)
            .add_float("rating", rating)
            .add_int64("product_id", product_id)
            .add_float_vector("vector", Vector::new(vector))
    }

    fn ready_store(dim: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_collection("reviews", review_schema(dim), CreateCollectionOptions::new())
            .unwrap();
        store
            .create_index(
                "reviews",
                "vector",
                FlatOption::new().metric(MetricType::Cosine).into(),
            )
            .unwrap();
        store.load("reviews").unwrap();
        store
    }

    #[test]
    fn test_collection_lifecycle() {
        let store = MemoryStore::new();
        assert!(!store.has_collection("reviews"));

        store
            .create_collection("reviews", review_schema(4), CreateCollectionOptions::new())
            .unwrap();
        assert!(store.has_collection("reviews"));
        assert_eq!(store.list_collections(), vec!["reviews"]);

        let info = store.describe_collection("reviews").unwrap();
        assert_eq!(info.name, "reviews");
        assert!(!info.loaded);
        assert!(info.indexes.is_empty());

        store.drop_collection("reviews").unwrap();
        assert!(!store.has_collection("reviews"));
        assert!(store.drop_collection("reviews").is_err());
    }

    #[test]
    fn test_collection_name_validation() {
        let store = MemoryStore::new();
        let schema = review_schema(4);
        let options = CreateCollectionOptions::new();

        assert!(store.create_collection("", schema.clone(), options.clone()).is_err());
        assert!(
            store
                .create_collection("1reviews", schema.clone(), options.clone())
                .is_err()
        );
        assert!(
            store
                .create_collection("re views", schema.clone(), options.clone())
                .is_err()
        );
        assert!(store.create_collection("reviews_2", schema, options).is_ok());
    }

    #[test]
    fn test_conflict_policy_error() {
        let store = MemoryStore::new();
        store
            .create_collection("reviews", review_schema(4), CreateCollectionOptions::new())
            .unwrap();

        // Same schema is accepted and keeps the collection.
        store
            .create_collection("reviews", review_schema(4), CreateCollectionOptions::new())
            .unwrap();

        // A different dimension is an incompatible schema.
        let err = store
            .create_collection("reviews", review_schema(8), CreateCollectionOptions::new())
            .unwrap_err();
        assert!(matches!(err, CrocusError::SchemaConflict(_)));
    }

    #[test]
    fn test_drop_and_recreate_discards_rows() {
        let store = ready_store(4);
        store
            .insert(
                "reviews",
                vec![review("great blender", 5.0, 100, vec![1.0, 0.0, 0.0, 0.0])],
            )
            .unwrap();
        store.flush("reviews").unwrap();
        assert_eq!(store.num_entities("reviews").unwrap(), 1);

        let options =
            CreateCollectionOptions::new().conflict_policy(ConflictPolicy::DropAndRecreate);
        store
            .create_collection("reviews", review_schema(4), options)
            .unwrap();

        assert_eq!(store.num_entities("reviews").unwrap(), 0);
        let info = store.describe_collection("reviews").unwrap();
        assert!(info.indexes.is_empty(), "indexes do not survive recreation");
    }

    #[test]
    fn test_create_index_validation() {
        let store = MemoryStore::new();
        let schema = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 4 }))
            .add_field(FieldSchema::new("sparse", FieldType::SparseFloatVector))
            .add_field(FieldSchema::new("rating", FieldType::Float))
            .build()
            .unwrap();
        store
            .create_collection("items", schema, CreateCollectionOptions::new())
            .unwrap();

        // Dense index on a dense field.
        store
            .create_index(
                "items",
                "vector",
                HnswOption::new().metric(MetricType::L2).into(),
            )
            .unwrap();
        // Sparse index on a sparse field.
        store
            .create_index("items", "sparse", SparseInvertedIndexOption::new().into())
            .unwrap();

        // Mismatches.
        assert!(
            store
                .create_index("items", "vector", SparseInvertedIndexOption::new().into())
                .is_err()
        );
        assert!(
            store
                .create_index("items", "sparse", FlatOption::new().into())
                .is_err()
        );
        assert!(
            store
                .create_index(
                    "items",
                    "sparse",
                    SparseInvertedIndexOption {
                        metric: MetricType::Cosine
                    }
                    .into()
                )
                .is_err()
        );
        assert!(store.create_index("items", "rating", FlatOption::new().into()).is_err());
        assert!(store.create_index("items", "missing", FlatOption::new().into()).is_err());
    }

    #[test]
    fn test_load_requires_indexes() {
        let store = MemoryStore::new();
        store
            .create_collection("reviews", review_schema(4), CreateCollectionOptions::new())
            .unwrap();
        assert!(store.load("reviews").is_err());

        store
            .create_index("reviews", "vector", FlatOption::new().into())
            .unwrap();
        store.load("reviews").unwrap();
    }

    #[test]
    fn test_search_requires_load() {
        let store = MemoryStore::new();
        store
            .create_collection("reviews", review_schema(4), CreateCollectionOptions::new())
            .unwrap();
        store
            .create_index("reviews", "vector", FlatOption::new().into())
            .unwrap();

        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0]);
        let err = store.search(&request).unwrap_err();
        assert!(matches!(err, CrocusError::CollectionNotLoaded(_)));

        store.load("reviews").unwrap();
        assert!(store.search(&request).is_ok());

        store.release("reviews").unwrap();
        assert!(store.search(&request).is_err());
    }

    #[test]
    fn test_missing_collection_errors() {
        let store = MemoryStore::new();
        let request = SearchRequest::new("missing", "vector", vec![1.0]);

        assert!(matches!(
            store.search(&request).unwrap_err(),
            CrocusError::CollectionNotFound(_)
        ));
        assert!(matches!(
            store.insert("missing", vec![Record::new()]).unwrap_err(),
            CrocusError::CollectionNotFound(_)
        ));
        assert!(store.num_entities("missing").is_err());
        assert!(store.describe_collection("missing").is_err());
    }

    #[test]
    fn test_inserts_invisible_until_flush() {
        let store = ready_store(4);
        let inserted = store
            .insert(
                "reviews",
                vec![review("sturdy handle", 4.0, 100, vec![1.0, 0.0, 0.0, 0.0])],
            )
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.num_entities("reviews").unwrap(), 0);

        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0]);
        assert!(store.search(&request).unwrap().is_empty());

        store.flush("reviews").unwrap();
        assert_eq!(store.num_entities("reviews").unwrap(), 1);
        assert_eq!(store.search(&request).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_validates_records() {
        let store = ready_store(4);

        // Wrong dimension.
        let err = store
            .insert(
                "reviews",
                vec![review("short vec", 3.0, 1, vec![1.0, 0.0])],
            )
            .unwrap_err();
        assert!(matches!(err, CrocusError::Other(_)));

        // Explicit id on an auto-id key.
        let record = review("explicit id", 3.0, 1, vec![0.0; 4]).add_varchar("id", "r1");
        assert!(store.insert("reviews", vec![record]).is_err());

        // Missing field.
        let record = Record::new()
            .add_varchar("comment", "no rating")
            .add_int64("product_id", 1)
            .add_float_vector("vector", Vector::new(vec![0.0; 4]));
        assert!(store.insert("reviews", vec![record]).is_err());

        // Nothing of the failed batches landed.
        store.flush("reviews").unwrap();
        assert_eq!(store.num_entities("reviews").unwrap(), 0);
    }

    #[test]
    fn test_auto_id_assignment() {
        // Varchar keys get generated string ids.
        let store = ready_store(4);
        store
            .insert(
                "reviews",
                vec![
                    review("first", 5.0, 1, vec![1.0, 0.0, 0.0, 0.0]),
                    review("second", 4.0, 2, vec![0.0, 1.0, 0.0, 0.0]),
                ],
            )
            .unwrap();
        store.flush("reviews").unwrap();

        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0]).limit(2);
        let hits = store.search(&request).unwrap();
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            match &hit.id {
                FieldValue::Varchar(id) => assert!(!id.is_empty()),
                other => panic!("expected varchar id, got {:?}", other),
            }
        }

        // Int64 keys count up from zero.
        let store = MemoryStore::new();
        let schema = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key().auto_id())
            .add_field(FieldSchema::new("vector", FieldType::FloatVector { dim: 2 }))
            .build()
            .unwrap();
        store
            .create_collection("items", schema, CreateCollectionOptions::new())
            .unwrap();
        store
            .create_index("items", "vector", FlatOption::new().into())
            .unwrap();
        store.load("items").unwrap();
        store
            .insert(
                "items",
                vec![
                    Record::new().add_float_vector("vector", Vector::new(vec![1.0, 0.0])),
                    Record::new().add_float_vector("vector", Vector::new(vec![0.9, 0.1])),
                ],
            )
            .unwrap();
        store.flush("items").unwrap();

        let hits = store
            .search(&SearchRequest::new("items", "vector", vec![1.0, 0.0]).limit(2))
            .unwrap();
        let mut ids: Vec<i64> = hits.iter().filter_map(|h| h.id.as_int64()).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let store = ready_store(4);
        store
            .insert(
                "reviews",
                vec![
                    review("far", 2.0, 1, vec![0.0, 1.0, 0.0, 0.0]),
                    review("exact", 5.0, 2, vec![1.0, 0.0, 0.0, 0.0]),
                    review("close", 4.0, 3, vec![0.9, 0.1, 0.0, 0.0]),
                ],
            )
            .unwrap();
        store.flush("reviews").unwrap();

        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0])
            .limit(3)
            .output_fields(["comment"]);
        let hits = store.search(&request).unwrap();

        assert_eq!(hits.len(), 3);
        let comments: Vec<&str> = hits
            .iter()
            .filter_map(|h| h.field("comment").and_then(FieldValue::as_varchar))
            .collect();
        assert_eq!(comments, vec!["exact", "close", "far"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);

        // Limit truncates after ordering.
        let top1 = store.search(&request.clone().limit(1)).unwrap();
        assert_eq!(top1.len(), 1);
        assert!((top1[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_applies_filter() {
        let store = ready_store(4);
        store
            .insert(
                "reviews",
                vec![
                    review("good", 5.0, 100, vec![1.0, 0.0, 0.0, 0.0]),
                    review("bad", 1.0, 200, vec![1.0, 0.0, 0.0, 0.0]),
                    review("fine", 3.0, 300, vec![1.0, 0.0, 0.0, 0.0]),
                ],
            )
            .unwrap();
        store.flush("reviews").unwrap();

        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0])
            .limit(10)
            .filter("rating >= 3 and product_id != 300")
            .output_fields(["product_id"]);
        let hits = store.search(&request).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits[0].field("product_id").and_then(FieldValue::as_int64),
            Some(100)
        );

        // Bad expressions and unknown fields fail up front.
        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0])
            .filter("rating >=");
        assert!(store.search(&request).is_err());
        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0])
            .filter("stars > 3");
        assert!(store.search(&request).is_err());
    }

    #[test]
    fn test_search_rejects_bad_queries() {
        let store = ready_store(4);

        // Dimension mismatch.
        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0]);
        assert!(store.search(&request).is_err());

        // Sparse query against a dense field.
        let sparse = SparseVector::new(vec![1], vec![1.0]);
        let request = SearchRequest::new("reviews", "vector", sparse);
        assert!(store.search(&request).is_err());

        // Unknown output field.
        let request = SearchRequest::new("reviews", "vector", vec![1.0, 0.0, 0.0, 0.0])
            .output_fields(["nope"]);
        assert!(store.search(&request).is_err());
    }

    #[test]
    fn test_sparse_search() {
        let store = MemoryStore::new();
        let schema = CollectionSchema::builder()
            .add_field(FieldSchema::new("id", FieldType::Int64).primary_key())
            .add_field(FieldSchema::new("sparse", FieldType::SparseFloatVector))
            .build()
            .unwrap();
        store
            .create_collection("docs", schema, CreateCollectionOptions::new())
            .unwrap();
        store
            .create_index("docs", "sparse", SparseInvertedIndexOption::new().into())
            .unwrap();
        store.load("docs").unwrap();

        let doc = |id: i64, indices: Vec<u32>, weights: Vec<f32>| {
            Record::new()
                .add_int64("id", id)
                .add_sparse_vector("sparse", SparseVector::new(indices, weights))
        };
        store
            .insert(
                "docs",
                vec![
                    doc(1, vec![1, 5], vec![1.0, 2.0]),
                    doc(2, vec![5, 9], vec![3.0, 1.0]),
                    doc(3, vec![7], vec![4.0]),
                ],
            )
            .unwrap();
        store.flush("docs").unwrap();

        let query = SparseVector::new(vec![5], vec![1.0]);
        let hits = store
            .search(&SearchRequest::new("docs", "sparse", query).limit(3))
            .unwrap();

        // Doc 3 shares no terms and scores zero but still ranks; docs 2 and 1
        // order by dot product.
        assert_eq!(hits[0].id.as_int64(), Some(2));
        assert!((hits[0].score - 3.0).abs() < 1e-6);
        assert_eq!(hits[1].id.as_int64(), Some(1));
        assert!((hits[1].score - 1.0).abs() < 1e-6);
    }
}
