// Distance kernels for dense and sparse feature vectors.
// Dense loops use two accumulators so the compiler can pipeline/vectorize them.

use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Metric a vector index ranks by. Both variants are distances: lower means closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    /// `1 - cosine_similarity`; a zero vector is at distance 1 from everything
    Cosine,
}

#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let chunks = a.chunks_exact(8);
    let remainder = chunks.remainder().len();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(8)) {
        dot0 += a_chunk[0] * b_chunk[0]
            + a_chunk[1] * b_chunk[1]
            + a_chunk[2] * b_chunk[2]
            + a_chunk[3] * b_chunk[3];
        dot1 += a_chunk[4] * b_chunk[4]
            + a_chunk[5] * b_chunk[5]
            + a_chunk[6] * b_chunk[6]
            + a_chunk[7] * b_chunk[7];
    }

    for i in (a.len() - remainder)..a.len() {
        dot0 += a[i] * b[i];
    }

    dot0 + dot1
}

#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder().len();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(4)) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];
        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder)..a.len() {
        let d = a[i] - b[i];
        sum0 += d * d;
    }

    (sum0 + sum1).sqrt()
}

#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine distance from a dot product and the two norms
#[inline]
pub fn cosine_distance_from_parts(dot: f32, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Euclidean distance between sparse vectors, merging the sorted index lists.
pub fn sparse_l2_distance(a: &SparseVector, b: &SparseVector) -> f32 {
    let (ai, av) = (a.indices(), a.values());
    let (bi, bv) = (b.indices(), b.values());
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0f32;

    while i < ai.len() && j < bi.len() {
        let d = match ai[i].cmp(&bi[j]) {
            Ordering::Less => {
                i += 1;
                av[i - 1]
            }
            Ordering::Greater => {
                j += 1;
                bv[j - 1]
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
                av[i - 1] - bv[j - 1]
            }
        };
        sum += d * d;
    }
    sum += av[i..].iter().map(|v| v * v).sum::<f32>();
    sum += bv[j..].iter().map(|v| v * v).sum::<f32>();
    sum.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_with_remainder() {
        let a: Vec<f32> = (1..=11).map(|i| i as f32).collect();
        let b = vec![1.0f32; 11];
        assert!((dot(&a, &b) - 66.0).abs() < 1e-4);
    }

    #[test]
    fn test_l2_distance() {
        assert!((l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(l2_distance(&a, &a), 0.0);
        assert_eq!(l2_distance(&[1.0], &[1.0, 2.0]), f32::INFINITY);
    }

    #[test]
    fn test_cosine_distance_zero_norm() {
        assert_eq!(cosine_distance_from_parts(0.0, 0.0, 1.0), 1.0);
        assert!(cosine_distance_from_parts(1.0, 1.0, 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sparse_l2_matches_dense() {
        let a = SparseVector::from_pairs(vec![(0, 3.0), (2, 1.0)]);
        let b = SparseVector::from_pairs(vec![(1, 4.0), (2, 1.0)]);
        let d = sparse_l2_distance(&a, &b);
        let dense = l2_distance(&[3.0, 0.0, 1.0], &[0.0, 4.0, 1.0]);
        assert!((d - dense).abs() < 1e-5);
        assert_eq!(sparse_l2_distance(&b, &SparseVector::default()), b.norm());
    }

    #[test]
    fn test_sparse_l2_identical_rows_is_zero() {
        let mut a = SparseVector::from_pairs(vec![(3, 0.37), (9, 1.91), (14, 0.052), (40, 2.6)]);
        a.normalize();
        assert_eq!(sparse_l2_distance(&a, &a.clone()), 0.0);
    }
}
