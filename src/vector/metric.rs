//! Distance metrics for dense vector scoring.

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};

/// Metric used to compare dense vectors.
///
/// The metric chosen for an index must match how the embedder normalizes its
/// output: cosine expects normalized vectors, and inner product on normalized
/// vectors is equivalent to cosine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    /// Euclidean distance.
    L2,
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Inner product.
    Ip,
}

impl MetricType {
    /// Distance between two vectors (lower is closer).
    ///
    /// For inner product the negated dot product is returned so that lower
    /// always means closer.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        let d = match self {
            MetricType::L2 => euclidean(a, b),
            MetricType::Cosine => 1.0 - cosine_similarity(a, b),
            MetricType::Ip => -dot(a, b),
        };
        Ok(d)
    }

    /// Similarity score between two vectors (higher is closer).
    ///
    /// L2 distance is mapped through `e^-d` so that identical vectors score
    /// 1.0 under every metric; cosine and inner product return their raw
    /// values.
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_dimensions(a, b)?;
        let s = match self {
            MetricType::L2 => (-euclidean(a, b)).exp(),
            MetricType::Cosine => cosine_similarity(a, b),
            MetricType::Ip => dot(a, b),
        };
        Ok(s)
    }

    /// Whether the metric is valid for sparse vector fields.
    pub fn supports_sparse(&self) -> bool {
        matches!(self, MetricType::Ip)
    }

    /// The canonical metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::L2 => "L2",
            MetricType::Cosine => "COSINE",
            MetricType::Ip => "IP",
        }
    }

    /// Parse a metric name. Accepts the canonical names in any case plus a
    /// few common aliases.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(MetricType::L2),
            "cosine" => Ok(MetricType::Cosine),
            "ip" | "inner_product" | "dot" => Ok(MetricType::Ip),
            _ => Err(CrocusError::invalid_argument(format!(
                "unknown metric type: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(CrocusError::invalid_argument(format!(
            "vector dimension mismatch: expected {}, got {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}
