//! Deterministic feature-hashing embedders.
//!
//! [`HashingTextEmbedder`] and [`HashingSparseEmbedder`] encode text without
//! any model weights or network access: each token is hashed with fixed
//! seeds, so the same text produces bit-identical vectors across processes
//! and platforms. They are the default embedders and the ones the test suite
//! runs against; for semantically meaningful embeddings use the
//! model-backed implementations behind the `embeddings-candle` and
//! `embeddings-openai` features.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::vector::{SparseVector, Vector};

use super::sparse_embedder::SparseTextEmbedder;
use super::text_embedder::TextEmbedder;

/// Default output dimension for [`HashingTextEmbedder::new`].
pub const DEFAULT_HASHING_DIMENSION: usize = 256;

// Fixed seeds keep token hashes stable across processes; ahash would
// otherwise randomize per process.
const HASH_SEEDS: [u64; 4] = [
    0x9e3779b97f4a7c15,
    0xbf58476d1ce4e5b9,
    0x94d049bb133111eb,
    0x2545f4914f6cdd1d,
];

fn token_seed(token: &str) -> u64 {
    let builder =
        ahash::RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3]);
    let mut hasher = builder.build_hasher();
    token.hash(&mut hasher);
    hasher.finish()
}

/// Split text into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

/// Dense embedder backed by feature hashing.
///
/// Each token is hashed to a seed that drives a pseudo-random signed
/// projection over the output dimensions; token projections are summed and
/// the result is L2 normalized. Texts sharing tokens land near each other,
/// disjoint texts are near orthogonal at reasonable dimensions. Empty text
/// encodes to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    dimension: usize,
    name: String,
}

impl HashingTextEmbedder {
    /// Create an embedder with the default dimension.
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_HASHING_DIMENSION)
    }

    /// Create an embedder producing vectors of the given dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            name: format!("hashing-{dimension}"),
            dimension,
        }
    }

    fn encode(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let mut rng = StdRng::seed_from_u64(token_seed(&token));
            for slot in data.iter_mut() {
                *slot += rng.random::<f32>() * 2.0 - 1.0;
            }
        }
        let mut vector = Vector::new(data);
        vector.normalize();
        vector
    }
}

impl Default for HashingTextEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextEmbedder for HashingTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.encode(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sparse embedder mapping tokens to stable term indices.
///
/// Token hashes are truncated to `u32` term indices, weighted by term
/// frequency and L2 normalized. Pairs with a sparse inverted index under the
/// inner-product metric, where the dot product of two encodings rewards
/// shared tokens.
#[derive(Debug, Clone, Default)]
pub struct HashingSparseEmbedder;

impl HashingSparseEmbedder {
    /// Create a sparse hashing embedder.
    pub fn new() -> Self {
        Self
    }

    fn encode(&self, text: &str) -> SparseVector {
        let mut weights: HashMap<u32, f32> = HashMap::new();
        for token in tokenize(text) {
            let index = token_seed(&token) as u32;
            *weights.entry(index).or_insert(0.0) += 1.0;
        }
        let mut vector = SparseVector::from_hashmap(&weights);
        vector.normalize();
        vector
    }
}

#[async_trait]
impl SparseTextEmbedder for HashingSparseEmbedder {
    async fn embed(&self, text: &str) -> Result<SparseVector> {
        Ok(self.encode(text))
    }

    fn name(&self) -> &str {
        "hashing-sparse"
    }
}
