//! Index declarations for vector fields.
//!
//! An [`IndexOption`] names the index structure built over a vector field and
//! carries the metric plus the structure's tuning knobs. The embedded store
//! accepts every index type and persists its parameters with the collection;
//! approximate types are evaluated by exact scan there, while an external
//! store backing the [`crate::store::VectorStore`] trait would build the real
//! structure.

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};
use crate::vector::MetricType;

/// The index structure over a vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// Exact scan.
    Flat,
    /// Inverted-file partitioning with exact distances inside probed lists.
    IvfFlat,
    /// Hierarchical navigable small-world graph.
    Hnsw,
    /// Store-chosen structure.
    AutoIndex,
    /// Inverted postings over sparse term indices.
    SparseInvertedIndex,
}

impl IndexType {
    /// The canonical index-type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Flat => "FLAT",
            IndexType::IvfFlat => "IVF_FLAT",
            IndexType::Hnsw => "HNSW",
            IndexType::AutoIndex => "AUTOINDEX",
            IndexType::SparseInvertedIndex => "SPARSE_INVERTED_INDEX",
        }
    }

    /// Parse a canonical index-type name in any case.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FLAT" => Ok(IndexType::Flat),
            "IVF_FLAT" => Ok(IndexType::IvfFlat),
            "HNSW" => Ok(IndexType::Hnsw),
            "AUTOINDEX" => Ok(IndexType::AutoIndex),
            "SPARSE_INVERTED_INDEX" => Ok(IndexType::SparseInvertedIndex),
            _ => Err(CrocusError::invalid_argument(format!(
                "unknown index type: {}",
                s
            ))),
        }
    }

    /// Whether the index applies to sparse vector fields.
    pub fn is_sparse(&self) -> bool {
        matches!(self, IndexType::SparseInvertedIndex)
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for an exact-scan index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FlatOption {
    /// Distance metric.
    #[serde(default)]
    pub metric: MetricType,
}

impl FlatOption {
    /// Create options with the default metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance metric.
    pub fn metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }
}

fn default_nlist() -> usize {
    1024
}

fn default_nprobe() -> usize {
    10
}

/// Options for an IVF_FLAT index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvfFlatOption {
    /// Distance metric.
    #[serde(default)]
    pub metric: MetricType,
    /// Number of partitions.
    #[serde(default = "default_nlist")]
    pub nlist: usize,
    /// Number of partitions probed per search.
    #[serde(default = "default_nprobe")]
    pub nprobe: usize,
}

impl Default for IvfFlatOption {
    fn default() -> Self {
        IvfFlatOption {
            metric: MetricType::default(),
            nlist: default_nlist(),
            nprobe: default_nprobe(),
        }
    }
}

impl IvfFlatOption {
    /// Create options with the observed defaults (nlist 1024, nprobe 10).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance metric.
    pub fn metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }

    /// Set the number of partitions.
    pub fn nlist(mut self, nlist: usize) -> Self {
        self.nlist = nlist;
        self
    }

    /// Set the number of partitions probed per search.
    pub fn nprobe(mut self, nprobe: usize) -> Self {
        self.nprobe = nprobe;
        self
    }
}

fn default_m() -> usize {
    8
}

fn default_ef_construction() -> usize {
    64
}

fn default_ef() -> usize {
    64
}

/// Options for an HNSW index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswOption {
    /// Distance metric.
    #[serde(default)]
    pub metric: MetricType,
    /// Maximum connections per node.
    #[serde(default = "default_m")]
    pub m: usize,
    /// Candidate list size while building.
    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,
    /// Candidate list size while searching.
    #[serde(default = "default_ef")]
    pub ef: usize,
}

impl Default for HnswOption {
    fn default() -> Self {
        HnswOption {
            metric: MetricType::default(),
            m: default_m(),
            ef_construction: default_ef_construction(),
            ef: default_ef(),
        }
    }
}

impl HnswOption {
    /// Create options with the observed defaults (m 8, ef_construction 64,
    /// ef 64).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance metric.
    pub fn metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }

    /// Set the maximum connections per node.
    pub fn m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Set the build-time candidate list size.
    pub fn ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    /// Set the search-time candidate list size.
    pub fn ef(mut self, ef: usize) -> Self {
        self.ef = ef;
        self
    }
}

/// Options for a store-chosen index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AutoIndexOption {
    /// Distance metric.
    #[serde(default)]
    pub metric: MetricType,
}

impl AutoIndexOption {
    /// Create options with the default metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance metric.
    pub fn metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }
}

fn default_sparse_metric() -> MetricType {
    MetricType::Ip
}

/// Options for a sparse inverted index.
///
/// Sparse postings only support inner-product scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseInvertedIndexOption {
    /// Distance metric; must be inner product.
    #[serde(default = "default_sparse_metric")]
    pub metric: MetricType,
}

impl Default for SparseInvertedIndexOption {
    fn default() -> Self {
        SparseInvertedIndexOption {
            metric: default_sparse_metric(),
        }
    }
}

impl SparseInvertedIndexOption {
    /// Create options with inner-product scoring.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Index declaration for one vector field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum IndexOption {
    /// Exact scan.
    Flat(FlatOption),
    /// Inverted-file partitioning.
    IvfFlat(IvfFlatOption),
    /// Navigable small-world graph.
    Hnsw(HnswOption),
    /// Store-chosen structure.
    AutoIndex(AutoIndexOption),
    /// Inverted postings over sparse terms.
    SparseInvertedIndex(SparseInvertedIndexOption),
}

impl IndexOption {
    /// The declared index type.
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexOption::Flat(_) => IndexType::Flat,
            IndexOption::IvfFlat(_) => IndexType::IvfFlat,
            IndexOption::Hnsw(_) => IndexType::Hnsw,
            IndexOption::AutoIndex(_) => IndexType::AutoIndex,
            IndexOption::SparseInvertedIndex(_) => IndexType::SparseInvertedIndex,
        }
    }

    /// The declared distance metric.
    pub fn metric(&self) -> MetricType {
        match self {
            IndexOption::Flat(o) => o.metric,
            IndexOption::IvfFlat(o) => o.metric,
            IndexOption::Hnsw(o) => o.metric,
            IndexOption::AutoIndex(o) => o.metric,
            IndexOption::SparseInvertedIndex(o) => o.metric,
        }
    }
}

impl From<FlatOption> for IndexOption {
    fn from(o: FlatOption) -> Self {
        IndexOption::Flat(o)
    }
}

impl From<IvfFlatOption> for IndexOption {
    fn from(o: IvfFlatOption) -> Self {
        IndexOption::IvfFlat(o)
    }
}

impl From<HnswOption> for IndexOption {
    fn from(o: HnswOption) -> Self {
        IndexOption::Hnsw(o)
    }
}

impl From<AutoIndexOption> for IndexOption {
    fn from(o: AutoIndexOption) -> Self {
        IndexOption::AutoIndex(o)
    }
}

impl From<SparseInvertedIndexOption> for IndexOption {
    fn from(o: SparseInvertedIndexOption) -> Self {
        IndexOption::SparseInvertedIndex(o)
    }
}
