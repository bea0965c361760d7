use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sparse vector of `(column, weight)` pairs with strictly increasing columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from parallel arrays. Returns `None` unless both arrays have
    /// the same length and the indices are strictly increasing.
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Option<Self> {
        if indices.len() != values.len() {
            return None;
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self { indices, values })
    }

    /// Build from unordered pairs; repeated columns are summed and explicit
    /// zeros dropped.
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_unstable_by_key(|(idx, _)| *idx);

        let mut indices: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            match indices.last() {
                Some(&last) if last == idx => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(idx);
                    values.push(value);
                }
            }
        }

        let mut v = Self { indices, values };
        v.prune_zeros();
        v
    }

    pub fn from_dense(data: &[f32]) -> Self {
        let (indices, values) = data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i as u32, *v))
            .unzip();
        Self { indices, values }
    }

    fn prune_zeros(&mut self) {
        if self.values.iter().all(|v| *v != 0.0) {
            return;
        }
        let (indices, values) = self
            .indices
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (*i, *v))
            .unzip();
        self.indices = indices;
        self.values = values;
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest column index, if any
    pub fn max_index(&self) -> Option<u32> {
        self.indices.last().copied()
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scale to unit L2 length; zero vectors stay zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv = 1.0 / norm;
            for v in &mut self.values {
                *v *= inv;
            }
        }
    }

    pub fn to_dense(&self, dim: usize) -> Vec<f32> {
        let mut out = vec![0.0; dim];
        for (idx, value) in self.iter() {
            if let Some(slot) = out.get_mut(idx as usize) {
                *slot = value;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_merges_and_sorts() {
        let v = SparseVector::from_pairs(vec![(5, 1.0), (1, 2.0), (5, 2.0), (3, 0.0)]);
        assert_eq!(v.indices(), &[1, 5]);
        assert_eq!(v.values(), &[2.0, 3.0]);
    }

    #[test]
    fn test_new_rejects_unsorted() {
        assert!(SparseVector::new(vec![2, 1], vec![1.0, 1.0]).is_none());
        assert!(SparseVector::new(vec![1, 1], vec![1.0, 1.0]).is_none());
        assert!(SparseVector::new(vec![1], vec![]).is_none());
        assert!(SparseVector::new(vec![1, 4], vec![1.0, 1.0]).is_some());
    }

    #[test]
    fn test_dot_and_normalize() {
        let a = SparseVector::from_pairs(vec![(0, 1.0), (2, 2.0), (7, 1.0)]);
        let b = SparseVector::from_pairs(vec![(2, 3.0), (7, 2.0), (9, 5.0)]);
        assert!((a.dot(&b) - 8.0).abs() < 1e-6);

        let mut c = SparseVector::from_pairs(vec![(1, 3.0), (4, 4.0)]);
        c.normalize();
        assert!((c.norm() - 1.0).abs() < 1e-6);

        let mut zero = SparseVector::default();
        zero.normalize();
        assert!(zero.is_empty());
    }

    #[test]
    fn test_dense_conversion() {
        let v = SparseVector::from_dense(&[0.0, 1.5, 0.0, 2.0]);
        assert_eq!(v.indices(), &[1, 3]);
        assert_eq!(v.to_dense(4), vec![0.0, 1.5, 0.0, 2.0]);
    }
}
