//! Text embedding support.
//!
//! This module defines the trait seam between the indexing/search pipeline
//! and whatever turns text into vectors: [`TextEmbedder`] for dense
//! embeddings and [`SparseTextEmbedder`] for sparse term-weight embeddings.
//! The built-in [`HashingTextEmbedder`] and [`HashingSparseEmbedder`] are
//! deterministic hashing encoders that need no model files, which makes them
//! the default for tests and quick starts.
//!
//! # Feature Flags
//!
//! Model-backed embedders are opt-in:
//!
//! - `embeddings-candle` - local BERT inference via HuggingFace Candle
//! - `embeddings-openai` - OpenAI Embeddings API
//! - `embeddings-all` - both of the above
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "embeddings-candle")]
//! # {
//! use crocus::embedding::{CandleTextEmbedder, TextEmbedder};
//!
//! # async fn example() -> crocus::error::Result<()> {
//! let embedder = CandleTextEmbedder::new("sentence-transformers/all-MiniLM-L6-v2")?;
//! let vector = embedder.embed("Hello, world!").await?;
//! println!("dimension: {}", embedder.dimension());
//! # Ok(())
//! # }
//! # }
//! ```
//!
//! Custom embedders implement the trait directly:
//!
//! ```
//! use async_trait::async_trait;
//! use crocus::embedding::TextEmbedder;
//! use crocus::error::Result;
//! use crocus::vector::Vector;
//!
//! struct MyEmbedder {
//!     dimension: usize,
//! }
//!
//! #[async_trait]
//! impl TextEmbedder for MyEmbedder {
//!     async fn embed(&self, text: &str) -> Result<Vector> {
//!         Ok(Vector::new(vec![0.0; self.dimension]))
//!     }
//!
//!     fn dimension(&self) -> usize {
//!         self.dimension
//!     }
//! }
//! ```

pub mod hashing;
pub mod sparse_embedder;
pub mod text_embedder;

#[cfg(feature = "embeddings-candle")]
pub mod candle_text_embedder;

#[cfg(feature = "embeddings-openai")]
pub mod openai_text_embedder;

pub use hashing::{HashingSparseEmbedder, HashingTextEmbedder};
pub use sparse_embedder::SparseTextEmbedder;
pub use text_embedder::TextEmbedder;

#[cfg(feature = "embeddings-candle")]
pub use candle_text_embedder::{CandleTextEmbedder, DEFAULT_CANDLE_MODEL};

#[cfg(feature = "embeddings-openai")]
pub use openai_text_embedder::OpenAITextEmbedder;
