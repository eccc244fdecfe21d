//! JSON snapshot persistence for the embedded store.
//!
//! Layout under a [`Storage`]: a `manifest.json` naming the collections,
//! plus `<name>.meta.json` (schema, options, indexes, id counter) and
//! `<name>.rows.json` (flushed rows) per collection. Every file is written
//! atomically, so a snapshot is either the previous state or the new one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};
use crate::index::IndexOption;
use crate::record::Record;
use crate::schema::CollectionSchema;
use crate::storage::Storage;
use crate::store::ConsistencyLevel;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Top-level snapshot manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreManifest {
    /// Format version, bumped on incompatible layout changes.
    pub version: u32,
    /// Names of persisted collections.
    pub collections: Vec<String>,
}

/// Persisted collection metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// Collection name.
    pub name: String,
    /// The collection schema.
    pub schema: CollectionSchema,
    /// Read visibility guarantee the collection was created with.
    #[serde(default)]
    pub consistency_level: ConsistencyLevel,
    /// Indexes by vector field name.
    #[serde(default)]
    pub indexes: HashMap<String, IndexOption>,
    /// Next value for an Int64 auto-id primary key.
    #[serde(default)]
    pub next_auto_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionRows {
    rows: Vec<Record>,
}

fn meta_file(collection: &str) -> String {
    format!("{}.meta.json", collection)
}

fn rows_file(collection: &str) -> String {
    format!("{}.rows.json", collection)
}

/// Write the manifest.
pub fn save_manifest(storage: &dyn Storage, collections: Vec<String>) -> Result<()> {
    let manifest = StoreManifest {
        version: MANIFEST_VERSION,
        collections,
    };
    let bytes = serde_json::to_vec_pretty(&manifest)?;
    storage.write_atomic(MANIFEST_FILE, &bytes)
}

/// Read the manifest, if one was ever written.
pub fn load_manifest(storage: &dyn Storage) -> Result<Option<StoreManifest>> {
    if !storage.exists(MANIFEST_FILE) {
        return Ok(None);
    }
    let bytes = storage.read(MANIFEST_FILE)?;
    let manifest: StoreManifest = serde_json::from_slice(&bytes)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(CrocusError::storage(format!(
            "manifest version mismatch: expected {}, found {}",
            MANIFEST_VERSION, manifest.version
        )));
    }
    Ok(Some(manifest))
}

/// Write one collection's metadata and flushed rows.
pub fn save_collection(
    storage: &dyn Storage,
    meta: &CollectionMeta,
    rows: &[Record],
) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(meta)?;
    storage.write_atomic(&meta_file(&meta.name), &bytes)?;

    let rows = CollectionRows {
        rows: rows.to_vec(),
    };
    let bytes = serde_json::to_vec(&rows)?;
    storage.write_atomic(&rows_file(&meta.name), &bytes)
}

/// Read one collection's metadata and flushed rows.
pub fn load_collection(
    storage: &dyn Storage,
    collection: &str,
) -> Result<(CollectionMeta, Vec<Record>)> {
    let bytes = storage.read(&meta_file(collection))?;
    let meta: CollectionMeta = serde_json::from_slice(&bytes)?;

    let rows = if storage.exists(&rows_file(collection)) {
        let bytes = storage.read(&rows_file(collection))?;
        let rows: CollectionRows = serde_json::from_slice(&bytes)?;
        rows.rows
    } else {
        Vec::new()
    };
    Ok((meta, rows))
}

/// Remove one collection's snapshot files.
pub fn delete_collection(storage: &dyn Storage, collection: &str) -> Result<()> {
    storage.delete(&meta_file(collection))?;
    storage.delete(&rows_file(collection))
}
