use crate::distance;
use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};

/// A dense vector of floating point numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        distance::norm(&self.data)
    }
}

/// Feature representation of a catalog item or a vectorized query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureVector {
    /// Fixed-dimension numeric attributes
    Dense(Vector),
    /// Weighted terms over a vocabulary
    Sparse(SparseVector),
}

impl FeatureVector {
    /// Whether every column index fits in `dim`
    pub fn fits(&self, dim: usize) -> bool {
        match self {
            FeatureVector::Dense(v) => v.dim() == dim,
            FeatureVector::Sparse(s) => s.max_index().map_or(true, |m| (m as usize) < dim),
        }
    }

    /// Reported dimension: the dense length, or the highest used column + 1
    pub fn dim_hint(&self) -> usize {
        match self {
            FeatureVector::Dense(v) => v.dim(),
            FeatureVector::Sparse(s) => s.max_index().map_or(0, |m| m as usize + 1),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureVector::Sparse(_))
    }

    /// No NaN or infinite component
    pub fn is_finite(&self) -> bool {
        match self {
            FeatureVector::Dense(v) => v.as_slice().iter().all(|x| x.is_finite()),
            FeatureVector::Sparse(s) => s.values().iter().all(|x| x.is_finite()),
        }
    }

    pub fn to_dense(&self, dim: usize) -> Vec<f32> {
        match self {
            FeatureVector::Dense(v) => v.as_slice().to_vec(),
            FeatureVector::Sparse(s) => s.to_dense(dim),
        }
    }

    pub fn to_sparse(&self) -> SparseVector {
        match self {
            FeatureVector::Dense(v) => SparseVector::from_dense(v.as_slice()),
            FeatureVector::Sparse(s) => s.clone(),
        }
    }
}

impl From<Vector> for FeatureVector {
    fn from(v: Vector) -> Self {
        FeatureVector::Dense(v)
    }
}

impl From<SparseVector> for FeatureVector {
    fn from(s: SparseVector) -> Self {
        FeatureVector::Sparse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        assert!((Vector::new(vec![3.0, 4.0]).norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_finite() {
        assert!(FeatureVector::from(Vector::new(vec![0.5, -2.0])).is_finite());
        assert!(!FeatureVector::from(Vector::new(vec![0.5, f32::NAN])).is_finite());
        assert!(!FeatureVector::from(SparseVector::from_pairs(vec![(1, f32::INFINITY)])).is_finite());
    }

    #[test]
    fn test_feature_fits() {
        let dense = FeatureVector::from(Vector::new(vec![1.0, 2.0, 3.0]));
        assert!(dense.fits(3));
        assert!(!dense.fits(4));

        let sparse = FeatureVector::from(SparseVector::from_pairs(vec![(4, 1.0)]));
        assert!(sparse.fits(5));
        assert!(!sparse.fits(4));
        assert!(FeatureVector::from(SparseVector::default()).fits(0));
    }
}
