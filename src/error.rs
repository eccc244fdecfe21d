//! Error types for the Crocus library.
//!
//! All fallible operations in this crate return [`Result`], whose error type
//! is the [`CrocusError`] enum. Constructor helpers keep call sites short.
//!
//! # Examples
//!
//! ```
//! use crocus::error::{CrocusError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(CrocusError::invalid_argument("limit must be greater than zero"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Crocus operations.
///
/// Uses `thiserror` for the `Error` trait implementation and provides
/// constructor methods for the variants that carry a message.
#[derive(Error, Debug)]
pub enum CrocusError {
    /// I/O errors (file operations, storage backends, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure to reach or open the vector store behind a URI.
    /// Fatal to the run that raised it.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A collection with the requested name exists with an incompatible schema.
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    /// Schema definition or validation errors.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The embedding model could not be loaded or reached.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Embedding a text failed after the model was loaded.
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// The named collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The collection exists but has not been loaded for search.
    #[error("Collection not loaded: {0}")]
    CollectionNotLoaded(String),

    /// Index configuration or build errors.
    #[error("Index error: {0}")]
    Index(String),

    /// Filter expression parsing errors.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Storage-related errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with CrocusError.
pub type Result<T> = std::result::Result<T, CrocusError>;

impl CrocusError {
    /// Create a new connection-failure error.
    pub fn connection_failed<S: Into<String>>(msg: S) -> Self {
        CrocusError::ConnectionFailed(msg.into())
    }

    /// Create a new schema-conflict error.
    pub fn schema_conflict<S: Into<String>>(msg: S) -> Self {
        CrocusError::SchemaConflict(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        CrocusError::Schema(msg.into())
    }

    /// Create a new model-unavailable error.
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        CrocusError::ModelUnavailable(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        CrocusError::EmbeddingFailed(msg.into())
    }

    /// Create a new collection-not-found error.
    pub fn collection_not_found<S: Into<String>>(msg: S) -> Self {
        CrocusError::CollectionNotFound(msg.into())
    }

    /// Create a new collection-not-loaded error.
    pub fn collection_not_loaded<S: Into<String>>(msg: S) -> Self {
        CrocusError::CollectionNotLoaded(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        CrocusError::Index(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        CrocusError::Parse(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        CrocusError::Storage(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        CrocusError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        CrocusError::Other(format!("Internal error: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CrocusError::Other(msg.into())
    }
}
