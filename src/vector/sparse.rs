//! Sparse vector representation.
//!
//! Sparse vectors hold only their non-zero components as (term index, weight)
//! pairs in coordinate (COO) form, kept sorted by index so that dot products
//! run as a single sorted merge. They have no declared dimension; the index
//! space is whatever the sparse embedder emits (a hashed vocabulary here).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A sparse weighted-term vector.
///
/// Entries are sorted by strictly increasing index. Duplicate indices passed
/// to a constructor are combined by summing their weights; zero weights are
/// dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Create a sparse vector from parallel index/weight lists.
    ///
    /// The shorter list bounds the result if the lengths differ.
    pub fn new(indices: Vec<u32>, weights: Vec<f32>) -> Self {
        let pairs = indices.into_iter().zip(weights).collect();
        Self::from_pairs(pairs)
    }

    /// Create a sparse vector from (index, weight) pairs.
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|(index, _)| *index);
        let mut entries: Vec<(u32, f32)> = Vec::with_capacity(pairs.len());
        for (index, weight) in pairs {
            match entries.last_mut() {
                Some((last, acc)) if *last == index => *acc += weight,
                _ => entries.push((index, weight)),
            }
        }
        entries.retain(|(_, weight)| *weight != 0.0);
        SparseVector { entries }
    }

    /// Create a sparse vector from a term-weight map.
    pub fn from_hashmap(weights: &HashMap<u32, f32>) -> Self {
        Self::from_pairs(weights.iter().map(|(i, w)| (*i, *w)).collect())
    }

    /// The number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no non-zero entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries as sorted (index, weight) pairs.
    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    /// Iterate over the sorted (index, weight) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product with another sparse vector via sorted merge.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (ai, aw) = self.entries[i];
            let (bi, bw) = other.entries[j];
            if ai == bi {
                sum += aw * bw;
                i += 1;
                j += 1;
            } else if ai < bi {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    /// The L2 norm over the non-zero weights.
    pub fn l2_norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, w)| w * w)
            .sum::<f32>()
            .sqrt()
    }

    /// Scale the weights to unit L2 norm in place.
    pub fn normalize(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
    }

    /// Return a unit-norm copy.
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }

    /// Whether all weights are finite.
    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(|(_, w)| w.is_finite())
    }
}
