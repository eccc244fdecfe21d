//! Dense vector representation.

use serde::{Deserialize, Serialize};

use crate::error::{CrocusError, Result};

/// A dense vector of 32-bit floats.
///
/// Every dense vector stored in a collection has the dimension declared by
/// the collection schema, which equals the embedder's output dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// The vector components.
    pub data: Vec<f32>,
}

impl Vector {
    /// Create a new vector from raw components.
    pub fn new(data: Vec<f32>) -> Self {
        Vector { data }
    }

    /// Create a zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Vector {
            data: vec![0.0; dimension],
        }
    }

    /// The number of components.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no components.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The components as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The L2 (Euclidean) norm.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Scale the vector to unit length in place.
    ///
    /// A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for x in &mut self.data {
                *x /= norm;
            }
        }
    }

    /// Return a unit-length copy of the vector.
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }

    /// Whether all components are finite (no NaN or infinity).
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Check that the vector has the expected dimension.
    pub fn validate_dimension(&self, expected: usize) -> Result<()> {
        if self.dimension() != expected {
            return Err(CrocusError::invalid_argument(format!(
                "vector dimension mismatch: expected {}, got {}",
                expected,
                self.dimension()
            )));
        }
        Ok(())
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

impl From<Vector> for Vec<f32> {
    fn from(vector: Vector) -> Self {
        vector.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_and_norm() {
        let v = Vector::new(vec![3.0, 4.0]);
        assert_eq!(v.dimension(), 2);
        assert!((v.norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = Vector::new(vec![3.0, 4.0]);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert!((v.data[0] - 0.6).abs() < 1e-6);
        assert!((v.data[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = Vector::zeros(3);
        v.normalize();
        assert_eq!(v.data, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_is_valid() {
        assert!(Vector::new(vec![1.0, 2.0]).is_valid());
        assert!(!Vector::new(vec![1.0, f32::NAN]).is_valid());
        assert!(!Vector::new(vec![f32::INFINITY]).is_valid());
    }

    #[test]
    fn test_validate_dimension() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert!(v.validate_dimension(3).is_ok());
        assert!(v.validate_dimension(4).is_err());
    }
}
