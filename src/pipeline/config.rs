//! Configuration for the review indexing workflow.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{HnswOption, IndexOption, SparseInvertedIndexOption};
use crate::schema::{CollectionSchema, FieldSchema, FieldType};
use crate::store::{ConflictPolicy, ConsistencyLevel, CreateCollectionOptions};

fn default_collection() -> String {
    "search_by_reviews".to_string()
}

fn default_id_field() -> String {
    "pk".to_string()
}

fn default_text_field() -> String {
    "comment".to_string()
}

fn default_rating_field() -> String {
    "rating".to_string()
}

fn default_product_id_field() -> String {
    "product_id".to_string()
}

fn default_dense_field() -> String {
    "vector".to_string()
}

fn default_sparse_field() -> String {
    "sparse_vector".to_string()
}

fn default_dense_index() -> IndexOption {
    HnswOption::new().into()
}

fn default_sparse_index() -> IndexOption {
    SparseInvertedIndexOption::new().into()
}

fn default_pk_max_length() -> usize {
    100
}

fn default_text_max_length() -> usize {
    65535
}

fn default_insert_chunk_size() -> usize {
    50
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_min_text_len() -> usize {
    10
}

/// Names and knobs for one review collection.
///
/// The defaults reproduce the observed review-search setup: a collection
/// named `search_by_reviews` holding an auto-generated varchar key, the
/// review text, rating and product id scalars, and a dense vector field
/// indexed with HNSW under cosine similarity; inserts are chunked at 50
/// records and embedding runs in batches of 32 texts. Setting
/// [`hybrid`](Self::hybrid) adds a sparse vector field with an
/// inner-product inverted index next to the dense one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewIndexConfig {
    /// Collection name.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Primary-key field name.
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Review text field name.
    #[serde(default = "default_text_field")]
    pub text_field: String,
    /// Rating field name.
    #[serde(default = "default_rating_field")]
    pub rating_field: String,
    /// Product id field name.
    #[serde(default = "default_product_id_field")]
    pub product_id_field: String,
    /// Dense vector field name.
    #[serde(default = "default_dense_field")]
    pub dense_field: String,
    /// Sparse vector field name; only used for hybrid collections.
    #[serde(default = "default_sparse_field")]
    pub sparse_field: String,
    /// Whether to store a sparse vector field alongside the dense one.
    #[serde(default)]
    pub hybrid: bool,
    /// Index over the dense vector field.
    #[serde(default = "default_dense_index")]
    pub dense_index: IndexOption,
    /// Index over the sparse vector field.
    #[serde(default = "default_sparse_index")]
    pub sparse_index: IndexOption,
    /// Read visibility guarantee requested at collection creation.
    #[serde(default)]
    pub consistency_level: ConsistencyLevel,
    /// What to do when the collection name already exists.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    /// Maximum length of auto-generated primary keys.
    #[serde(default = "default_pk_max_length")]
    pub pk_max_length: usize,
    /// Maximum length of the review text.
    #[serde(default = "default_text_max_length")]
    pub text_max_length: usize,
    /// Records per insert call.
    #[serde(default = "default_insert_chunk_size")]
    pub insert_chunk_size: usize,
    /// Texts per embedding batch.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
    /// Rows whose text is shorter than this many characters are skipped.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
}

impl Default for ReviewIndexConfig {
    fn default() -> Self {
        ReviewIndexConfig {
            collection: default_collection(),
            id_field: default_id_field(),
            text_field: default_text_field(),
            rating_field: default_rating_field(),
            product_id_field: default_product_id_field(),
            dense_field: default_dense_field(),
            sparse_field: default_sparse_field(),
            hybrid: false,
            dense_index: default_dense_index(),
            sparse_index: default_sparse_index(),
            consistency_level: ConsistencyLevel::default(),
            conflict_policy: ConflictPolicy::default(),
            pk_max_length: default_pk_max_length(),
            text_max_length: default_text_max_length(),
            insert_chunk_size: default_insert_chunk_size(),
            embed_batch_size: default_embed_batch_size(),
            min_text_len: default_min_text_len(),
        }
    }
}

impl ReviewIndexConfig {
    /// Create a configuration for the named collection with default knobs.
    pub fn new(collection: impl Into<String>) -> Self {
        ReviewIndexConfig {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Store a sparse vector field alongside the dense one.
    pub fn hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }

    /// Set the dense vector field name.
    pub fn dense_field(mut self, name: impl Into<String>) -> Self {
        self.dense_field = name.into();
        self
    }

    /// Set the sparse vector field name.
    pub fn sparse_field(mut self, name: impl Into<String>) -> Self {
        self.sparse_field = name.into();
        self
    }

    /// Set the index built over the dense vector field.
    pub fn dense_index(mut self, index: impl Into<IndexOption>) -> Self {
        self.dense_index = index.into();
        self
    }

    /// Set the index built over the sparse vector field.
    pub fn sparse_index(mut self, index: impl Into<IndexOption>) -> Self {
        self.sparse_index = index.into();
        self
    }

    /// Set the consistency level requested at collection creation.
    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = level;
        self
    }

    /// Set the conflict policy for collection creation.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Set the number of records per insert call.
    pub fn insert_chunk_size(mut self, size: usize) -> Self {
        self.insert_chunk_size = size;
        self
    }

    /// Set the number of texts per embedding batch.
    pub fn embed_batch_size(mut self, size: usize) -> Self {
        self.embed_batch_size = size;
        self
    }

    /// Set the minimum review text length; shorter rows are skipped.
    pub fn min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Build the collection schema for the given dense dimension.
    ///
    /// Field order matches the observed layout: key, text, scalars, then the
    /// sparse vector (hybrid only) and the dense vector.
    pub fn schema(&self, dimension: usize) -> Result<CollectionSchema> {
        let mut builder = CollectionSchema::builder()
            .add_field(
                FieldSchema::new(
                    &self.id_field,
                    FieldType::Varchar {
                        max_length: self.pk_max_length,
                    },
                )
                .primary_key()
                .auto_id(),
            )
            .add_field(FieldSchema::new(
                &self.text_field,
                FieldType::Varchar {
                    max_length: self.text_max_length,
                },
            ))
            .add_field(FieldSchema::new(&self.rating_field, FieldType::Float))
            .add_field(FieldSchema::new(&self.product_id_field, FieldType::Int64));
        if self.hybrid {
            builder = builder.add_field(FieldSchema::new(
                &self.sparse_field,
                FieldType::SparseFloatVector,
            ));
        }
        builder
            .add_field(FieldSchema::new(
                &self.dense_field,
                FieldType::FloatVector { dim: dimension },
            ))
            .build()
    }

    /// Collection creation options derived from this configuration.
    pub fn create_options(&self) -> CreateCollectionOptions {
        CreateCollectionOptions::new()
            .consistency_level(self.consistency_level)
            .conflict_policy(self.conflict_policy)
    }

    /// The scalar fields returned with every search hit.
    pub fn output_fields(&self) -> Vec<String> {
        vec![
            self.text_field.clone(),
            self.rating_field.clone(),
            self.product_id_field.clone(),
        ]
    }
}
