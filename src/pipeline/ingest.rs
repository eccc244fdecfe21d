//! Review ingestion: embed rows, create the collection and bring it to a
//! searchable state.

use std::path::Path;
use std::sync::Arc;

use crate::embedding::{SparseTextEmbedder, TextEmbedder};
use crate::error::{CrocusError, Result};
use crate::record::Record;
use crate::store::VectorStore;
use crate::vector::{SparseVector, Vector};

use super::config::ReviewIndexConfig;
use super::dataset::{ReviewRow, read_reviews};
use super::run_blocking;

/// Summary of one ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Rows accepted by this run.
    pub inserted: usize,
    /// Flushed entities in the collection after this run.
    pub total_entities: usize,
}

/// Builds a searchable review collection from raw rows.
///
/// One ingest run embeds every row, creates the collection and its vector
/// indexes if needed, loads it, inserts in chunks and flushes, so the
/// collection is queryable as soon as [`ingest`](ReviewIndexer::ingest)
/// returns. Reruns against an existing collection follow the configured
/// [`ConflictPolicy`](crate::store::ConflictPolicy): the default appends to a
/// schema-compatible collection, `DropAndRecreate` starts over.
pub struct ReviewIndexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn TextEmbedder>,
    sparse_embedder: Option<Arc<dyn SparseTextEmbedder>>,
    config: ReviewIndexConfig,
}

impl ReviewIndexer {
    /// Create an indexer writing to the collection described by `config`.
    ///
    /// The dense vector field takes its dimension from `embedder`, so the
    /// schema always matches what the embedder produces.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn TextEmbedder>,
        config: ReviewIndexConfig,
    ) -> Self {
        ReviewIndexer {
            store,
            embedder,
            sparse_embedder: None,
            config,
        }
    }

    /// Attach the sparse embedder; required for hybrid collections.
    pub fn with_sparse_embedder(mut self, embedder: Arc<dyn SparseTextEmbedder>) -> Self {
        self.sparse_embedder = Some(embedder);
        self
    }

    /// Read reviews from a CSV file and ingest them.
    ///
    /// Rows whose comment is shorter than the configured minimum length are
    /// skipped before embedding.
    pub async fn ingest_csv(&self, path: impl AsRef<Path>) -> Result<IngestStats> {
        let path = path.as_ref().to_path_buf();
        let min_len = self.config.min_text_len;
        let rows = run_blocking(move || read_reviews(&path, min_len)).await?;
        self.ingest(rows).await
    }

    /// Embed and index a batch of reviews.
    ///
    /// With an empty batch this still creates, indexes and loads the
    /// collection, leaving it searchable but empty.
    pub async fn ingest(&self, rows: Vec<ReviewRow>) -> Result<IngestStats> {
        if self.config.hybrid && self.sparse_embedder.is_none() {
            return Err(CrocusError::invalid_argument(
                "hybrid collections need a sparse embedder; call with_sparse_embedder",
            ));
        }

        self.prepare_collection().await?;

        let (dense, sparse) = self.embed_rows(&rows).await?;
        let records = self.build_records(rows, dense, sparse);

        let chunk_size = self.config.insert_chunk_size.max(1);
        let mut inserted = 0;
        let mut records = records.into_iter();
        loop {
            let chunk: Vec<Record> = records.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let store = Arc::clone(&self.store);
            let collection = self.config.collection.clone();
            inserted += run_blocking(move || store.insert(&collection, chunk)).await?;
        }

        let store = Arc::clone(&self.store);
        let collection = self.config.collection.clone();
        let total_entities = run_blocking(move || {
            store.flush(&collection)?;
            store.num_entities(&collection)
        })
        .await?;

        log::info!(
            "ingested {} reviews into {} ({} entities)",
            inserted,
            self.config.collection,
            total_entities
        );
        Ok(IngestStats {
            inserted,
            total_entities,
        })
    }

    /// Create the collection and its indexes, then load it for search.
    async fn prepare_collection(&self) -> Result<()> {
        let schema = self.config.schema(self.embedder.dimension())?;
        let options = self.config.create_options();

        let store = Arc::clone(&self.store);
        let collection = self.config.collection.clone();
        run_blocking(move || store.create_collection(&collection, schema, options)).await?;

        let store = Arc::clone(&self.store);
        let collection = self.config.collection.clone();
        let field = self.config.dense_field.clone();
        let option = self.config.dense_index.clone();
        run_blocking(move || store.create_index(&collection, &field, option)).await?;

        if self.config.hybrid {
            let store = Arc::clone(&self.store);
            let collection = self.config.collection.clone();
            let field = self.config.sparse_field.clone();
            let option = self.config.sparse_index.clone();
            run_blocking(move || store.create_index(&collection, &field, option)).await?;
        }

        let store = Arc::clone(&self.store);
        let collection = self.config.collection.clone();
        run_blocking(move || store.load(&collection)).await
    }

    async fn embed_rows(
        &self,
        rows: &[ReviewRow],
    ) -> Result<(Vec<Vector>, Option<Vec<SparseVector>>)> {
        let batch_size = self.config.embed_batch_size.max(1);
        let sparse_embedder = self
            .sparse_embedder
            .as_ref()
            .filter(|_| self.config.hybrid);

        let mut dense = Vec::with_capacity(rows.len());
        let mut sparse = sparse_embedder.map(|_| Vec::with_capacity(rows.len()));

        for batch in rows.chunks(batch_size) {
            let texts: Vec<&str> = batch.iter().map(|row| row.comment.as_str()).collect();
            dense.extend(self.embedder.embed_batch(&texts).await?);
            if let (Some(out), Some(embedder)) = (sparse.as_mut(), sparse_embedder) {
                out.extend(embedder.embed_batch(&texts).await?);
            }
        }
        Ok((dense, sparse))
    }

    fn build_records(
        &self,
        rows: Vec<ReviewRow>,
        dense: Vec<Vector>,
        sparse: Option<Vec<SparseVector>>,
    ) -> Vec<Record> {
        let mut sparse = sparse.map(|vectors| vectors.into_iter());
        rows.into_iter()
            .zip(dense)
            .map(|(row, vector)| {
                let mut record = Record::new()
                    .add_varchar(&self.config.text_field, row.comment)
                    .add_float(&self.config.rating_field, row.rating)
                    .add_int64(&self.config.product_id_field, row.product_id);
                if let Some(iter) = sparse.as_mut()
                    && let Some(sparse_vector) = iter.next()
                {
                    record = record.add_sparse_vector(&self.config.sparse_field, sparse_vector);
                }
                record.add_float_vector(&self.config.dense_field, vector)
            })
            .collect()
    }
}
