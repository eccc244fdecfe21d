//! Score fusion for hybrid search.
//!
//! A hybrid collection answers a query twice, once per vector field, and the
//! two ranked lists must merge into one. The combination is pluggable:
//! [`FusionStrategy::WeightedSum`] scales each branch's similarity by a
//! caller weight and sums per record, [`FusionStrategy::Rrf`] ignores raw
//! scores and sums reciprocal ranks.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::record::FieldValue;
use crate::store::SearchHit;

fn default_sparse_weight() -> f32 {
    0.7
}

fn default_dense_weight() -> f32 {
    1.0
}

/// Per-branch weights for weighted-sum fusion.
///
/// The defaults are the observed ones: sparse 0.7, dense 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchWeights {
    /// Weight applied to sparse-branch similarities.
    #[serde(default = "default_sparse_weight")]
    pub sparse: f32,
    /// Weight applied to dense-branch similarities.
    #[serde(default = "default_dense_weight")]
    pub dense: f32,
}

impl Default for SearchWeights {
    fn default() -> Self {
        SearchWeights {
            sparse: default_sparse_weight(),
            dense: default_dense_weight(),
        }
    }
}

impl SearchWeights {
    /// Create weights.
    pub fn new(sparse: f32, dense: f32) -> Self {
        SearchWeights { sparse, dense }
    }
}

fn default_rrf_k() -> usize {
    60
}

/// How the sparse and dense result lists combine into one ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Hits sharing a primary key accumulate `weight * similarity` from each
    /// branch they appear in.
    #[default]
    WeightedSum,
    /// Reciprocal rank fusion: each branch contributes `1 / (k + rank)` with
    /// 1-based ranks, so raw score scales do not matter.
    Rrf {
        /// Rank damping constant.
        #[serde(default = "default_rrf_k")]
        k: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HitKey {
    Int(i64),
    Str(String),
}

fn hit_key(id: &FieldValue) -> Option<HitKey> {
    match id {
        FieldValue::Int64(v) => Some(HitKey::Int(*v)),
        FieldValue::Varchar(s) => Some(HitKey::Str(s.clone())),
        _ => None,
    }
}

/// Fold one branch into the fused list, keyed by primary key.
fn accumulate(
    fused: &mut Vec<SearchHit>,
    by_key: &mut HashMap<HitKey, usize>,
    hits: Vec<SearchHit>,
    contribution: impl Fn(usize, &SearchHit) -> f32,
) {
    for (rank, mut hit) in hits.into_iter().enumerate() {
        let add = contribution(rank, &hit);
        let key = match hit_key(&hit.id) {
            Some(key) => key,
            None => {
                // No usable key; the hit cannot merge with anything.
                hit.score = add;
                hit.distance = -add;
                fused.push(hit);
                continue;
            }
        };
        match by_key.entry(key) {
            Entry::Occupied(slot) => {
                let existing = &mut fused[*slot.get()];
                existing.score += add;
                existing.distance = -existing.score;
                if existing.fields.is_empty() && !hit.fields.is_empty() {
                    existing.fields = std::mem::take(&mut hit.fields);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(fused.len());
                hit.score = add;
                hit.distance = -add;
                fused.push(hit);
            }
        }
    }
}

impl FusionStrategy {
    /// Fuse the two branches into one ranking of at most `limit` hits.
    ///
    /// `weights` applies to `WeightedSum`; RRF is purely rank-based. Fused
    /// hits carry the combined score (distance is its negation, as for inner
    /// product); the sort is stable, so equal scores keep sparse-branch
    /// order ahead of dense-only hits.
    pub fn fuse(
        &self,
        sparse_hits: Vec<SearchHit>,
        dense_hits: Vec<SearchHit>,
        weights: SearchWeights,
        limit: usize,
    ) -> Vec<SearchHit> {
        let mut fused = Vec::with_capacity(sparse_hits.len() + dense_hits.len());
        let mut by_key = HashMap::new();

        match self {
            FusionStrategy::WeightedSum => {
                accumulate(&mut fused, &mut by_key, sparse_hits, |_, hit| {
                    weights.sparse * hit.score
                });
                accumulate(&mut fused, &mut by_key, dense_hits, |_, hit| {
                    weights.dense * hit.score
                });
            }
            FusionStrategy::Rrf { k } => {
                let k = *k as f32;
                let reciprocal = |rank: usize, _: &SearchHit| 1.0 / (k + rank as f32 + 1.0);
                accumulate(&mut fused, &mut by_key, sparse_hits, reciprocal);
                accumulate(&mut fused, &mut by_key, dense_hits, reciprocal);
            }
        }

        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused.truncate(limit);
        fused
    }
}
