//! Vector value types and distance metrics.
//!
//! This module provides the numeric building blocks of the crate: dense
//! fixed-dimension vectors, sparse (term index, weight) vectors, and the
//! distance metrics used to rank them.
//!
//! # Module Structure
//!
//! - `dense`: Dense float vectors (normalization, validation)
//! - `sparse`: Sparse vectors in sorted COO form (sorted-merge dot product)
//! - `metric`: Metric type (L2, cosine, inner product) with distance and
//!   similarity scoring

pub mod dense;
pub mod metric;
pub mod sparse;

// Re-exports
pub use dense::Vector;
pub use metric::MetricType;
pub use sparse::SparseVector;
