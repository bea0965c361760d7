use crate::distance::{self, Metric};
use crate::{Error, FeatureVector, Result, SimilarityMatrix, SparseVector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::collections::BinaryHeap;

/// Catalogs at least this large are scanned in parallel chunks.
pub const PARALLEL_SCAN_THRESHOLD: usize = 16_384;

/// One ranked search result. For [`VectorIndex`] the score is a distance
/// (lower is closer); for [`MatrixIndex`] it is a similarity (higher is closer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub score: f32,
}

/// Heap entry ordered by `(distance, id)`; the max-heap top is the worst kept candidate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    dist: OrderedFloat<f32>,
    id: usize,
}

/// Bounded selection of the `k` best candidates
struct TopK {
    k: usize,
    heap: BinaryHeap<Candidate>,
}

impl TopK {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    #[inline]
    fn push(&mut self, id: usize, dist: f32) {
        self.push_candidate(Candidate {
            dist: OrderedFloat(dist),
            id,
        });
    }

    #[inline]
    fn push_candidate(&mut self, candidate: Candidate) {
        if self.heap.len() < self.k {
            self.heap.push(candidate);
        } else if let Some(worst) = self.heap.peek() {
            if candidate < *worst {
                self.heap.pop();
                self.heap.push(candidate);
            }
        }
    }

    fn merge(mut self, other: TopK) -> TopK {
        for candidate in other.heap {
            self.push_candidate(candidate);
        }
        self
    }

    fn into_sorted(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                id: c.id,
                score: c.dist.into_inner(),
            })
            .collect()
    }
}

/// `query(.., k)` hands back `k + 1` rows so the caller can drop the query
/// item itself; `k` must leave at least one other row in the catalog.
fn validate_k(k: usize, len: usize) -> Result<()> {
    if k < 1 || k >= len {
        return Err(Error::InvalidTopN {
            requested: k,
            catalog_size: len,
        });
    }
    Ok(())
}

enum Rows {
    /// Contiguous `len * dim` storage
    Dense { data: Vec<f32>, norms: Vec<f32> },
    Sparse { rows: Vec<SparseVector>, norms: Vec<f32> },
}

enum PreparedQuery {
    Dense { data: Vec<f32>, norm: f32 },
    Sparse { vector: SparseVector, norm: f32 },
}

/// Exact nearest-neighbor index over a fixed set of feature vectors.
///
/// Results are ordered by ascending distance with ties broken by the lower
/// row id, so repeated queries are fully deterministic.
pub struct VectorIndex {
    metric: Metric,
    dim: usize,
    len: usize,
    rows: Rows,
}

impl VectorIndex {
    /// Build from row-aligned vectors. All-dense input is packed into one
    /// contiguous buffer; anything else is kept sparse.
    pub fn build(vectors: Vec<FeatureVector>, dim: usize, metric: Metric) -> Result<Self> {
        if let Some(bad) = vectors.iter().find(|v| !v.fits(dim)) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim_hint(),
            });
        }

        let len = vectors.len();
        let rows = if vectors.iter().all(|v| !v.is_sparse()) {
            let mut data = Vec::with_capacity(len * dim);
            let mut norms = Vec::with_capacity(len);
            for v in &vectors {
                let dense = v.to_dense(dim);
                norms.push(distance::norm(&dense));
                data.extend_from_slice(&dense);
            }
            Rows::Dense { data, norms }
        } else {
            let rows: Vec<SparseVector> = vectors.iter().map(FeatureVector::to_sparse).collect();
            let norms = rows.iter().map(SparseVector::norm).collect();
            Rows::Sparse { rows, norms }
        };

        Ok(Self {
            metric,
            dim,
            len,
            rows,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.rows, Rows::Sparse { .. })
    }

    fn prepare(&self, query: &FeatureVector) -> Result<PreparedQuery> {
        if !query.fits(self.dim) {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim_hint(),
            });
        }
        Ok(match self.rows {
            Rows::Dense { .. } => {
                let data = query.to_dense(self.dim);
                let norm = distance::norm(&data);
                PreparedQuery::Dense { data, norm }
            }
            Rows::Sparse { .. } => {
                let vector = query.to_sparse();
                let norm = vector.norm();
                PreparedQuery::Sparse { vector, norm }
            }
        })
    }

    #[inline]
    fn distance(&self, query: &PreparedQuery, row: usize) -> f32 {
        match (&self.rows, query) {
            (Rows::Dense { data, norms }, PreparedQuery::Dense { data: q, norm }) => {
                let start = row * self.dim;
                let r = &data[start..start + self.dim];
                match self.metric {
                    Metric::Euclidean => distance::l2_distance(q, r),
                    Metric::Cosine => {
                        distance::cosine_distance_from_parts(distance::dot(q, r), *norm, norms[row])
                    }
                }
            }
            (Rows::Sparse { rows, norms }, PreparedQuery::Sparse { vector, norm }) => {
                let r = &rows[row];
                match self.metric {
                    Metric::Euclidean => distance::sparse_l2_distance(vector, r),
                    Metric::Cosine => {
                        distance::cosine_distance_from_parts(vector.dot(r), *norm, norms[row])
                    }
                }
            }
            // prepare() always matches the query layout to the rows
            _ => f32::INFINITY,
        }
    }

    /// The `min(n, len)` closest rows, ascending distance.
    pub fn nearest(&self, query: &FeatureVector, n: usize) -> Result<Vec<Neighbor>> {
        let query = self.prepare(query)?;
        let n = n.min(self.len);
        if n == 0 {
            return Ok(Vec::new());
        }

        let top = if self.len >= PARALLEL_SCAN_THRESHOLD {
            (0..self.len)
                .into_par_iter()
                .fold(
                    || TopK::new(n),
                    |mut top, row| {
                        top.push(row, self.distance(&query, row));
                        top
                    },
                )
                .reduce(|| TopK::new(n), TopK::merge)
        } else {
            let mut top = TopK::new(n);
            for row in 0..self.len {
                top.push(row, self.distance(&query, row));
            }
            top
        };

        Ok(top.into_sorted())
    }

    /// `k`-nearest query returning `k + 1` rows.
    pub fn query(&self, query: &FeatureVector, k: usize) -> Result<Vec<Neighbor>> {
        validate_k(k, self.len)?;
        self.nearest(query, k + 1)
    }
}

/// Nearest-neighbor lookup that reads rows of a precomputed similarity matrix.
pub struct MatrixIndex {
    matrix: SimilarityMatrix,
}

impl MatrixIndex {
    pub fn new(matrix: SimilarityMatrix) -> Self {
        Self { matrix }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.dim()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrix.dim() == 0
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// The `min(n, len)` most similar rows to `item_id`, descending
    /// similarity, ties by ascending id. The item itself is included.
    pub fn nearest(&self, item_id: usize, n: usize) -> Result<Vec<Neighbor>> {
        let row = self
            .matrix
            .row(item_id)
            .ok_or_else(|| Error::NotFound(format!("matrix row #{item_id}")))?;

        let mut ranked: Vec<Neighbor> = row
            .iter()
            .enumerate()
            .map(|(id, &score)| Neighbor { id, score })
            .collect();
        ranked.sort_unstable_by(|a, b| {
            OrderedFloat(b.score)
                .cmp(&OrderedFloat(a.score))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(n);
        Ok(ranked)
    }

    /// `k`-nearest query returning `k + 1` rows.
    pub fn query(&self, item_id: usize, k: usize) -> Result<Vec<Neighbor>> {
        validate_k(k, self.len())?;
        self.nearest(item_id, k + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use rand::{Rng, SeedableRng};

    fn dense(rows: &[&[f32]]) -> Vec<FeatureVector> {
        rows.iter()
            .map(|r| FeatureVector::Dense(Vector::from_slice(r)))
            .collect()
    }

    fn ids(neighbors: &[Neighbor]) -> Vec<usize> {
        neighbors.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_euclidean_order() {
        let index = VectorIndex::build(
            dense(&[&[0.0, 0.0], &[1.0, 0.0], &[5.0, 0.0], &[2.0, 0.0]]),
            2,
            Metric::Euclidean,
        )
        .unwrap();

        let query = FeatureVector::Dense(Vector::new(vec![0.0, 0.0]));
        let results = index.query(&query, 2).unwrap();
        assert_eq!(ids(&results), vec![0, 1, 3]);
        assert_eq!(results[0].score, 0.0);
        assert!((results[2].score - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_prefer_lower_id() {
        let index = VectorIndex::build(
            dense(&[&[1.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &[0.0, 1.0]]),
            2,
            Metric::Euclidean,
        )
        .unwrap();
        let query = FeatureVector::Dense(Vector::new(vec![0.0, 0.0]));
        let results = index.nearest(&query, 4).unwrap();
        assert_eq!(ids(&results), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_invalid_k() {
        let index = VectorIndex::build(dense(&[&[0.0], &[1.0], &[2.0]]), 1, Metric::Euclidean).unwrap();
        let query = FeatureVector::Dense(Vector::new(vec![0.0]));
        assert!(matches!(
            index.query(&query, 0),
            Err(Error::InvalidTopN { requested: 0, catalog_size: 3 })
        ));
        assert!(index.query(&query, 3).is_err());
        assert_eq!(index.query(&query, 2).unwrap().len(), 3);
    }

    #[test]
    fn test_dimension_checks() {
        let err = VectorIndex::build(dense(&[&[0.0, 1.0], &[1.0]]), 2, Metric::Euclidean).err();
        assert!(matches!(err, Some(Error::InvalidDimension { expected: 2, actual: 1 })));

        let index = VectorIndex::build(dense(&[&[0.0, 1.0], &[1.0, 0.0]]), 2, Metric::Cosine).unwrap();
        let bad = FeatureVector::Dense(Vector::new(vec![1.0, 0.0, 0.0]));
        assert!(index.nearest(&bad, 1).is_err());
    }

    #[test]
    fn test_sparse_cosine_and_zero_query() {
        let rows = vec![
            FeatureVector::Sparse(SparseVector::from_pairs(vec![(0, 1.0), (1, 1.0)])),
            FeatureVector::Sparse(SparseVector::from_pairs(vec![(2, 1.0)])),
            FeatureVector::Sparse(SparseVector::from_pairs(vec![(0, 1.0)])),
        ];
        let index = VectorIndex::build(rows, 3, Metric::Cosine).unwrap();
        assert!(index.is_sparse());

        let query = FeatureVector::Sparse(SparseVector::from_pairs(vec![(0, 2.0)]));
        assert_eq!(ids(&index.nearest(&query, 3).unwrap()), vec![2, 0, 1]);

        // An all out-of-vocabulary query is equidistant from everything
        let zero = FeatureVector::Sparse(SparseVector::default());
        let results = index.nearest(&zero, 3).unwrap();
        assert_eq!(ids(&results), vec![0, 1, 2]);
        assert!(results.iter().all(|n| n.score == 1.0));
    }

    #[test]
    fn test_dense_query_against_sparse_rows() {
        let rows = vec![
            FeatureVector::Sparse(SparseVector::from_pairs(vec![(0, 1.0)])),
            FeatureVector::Sparse(SparseVector::from_pairs(vec![(1, 1.0)])),
        ];
        let index = VectorIndex::build(rows, 2, Metric::Euclidean).unwrap();
        let query = FeatureVector::Dense(Vector::new(vec![0.0, 0.9]));
        assert_eq!(index.nearest(&query, 1).unwrap()[0].id, 1);
    }

    #[test]
    fn test_parallel_scan_matches_full_sort() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let dim = 4;
        let rows: Vec<Vec<f32>> = (0..PARALLEL_SCAN_THRESHOLD + 100)
            .map(|_| (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect())
            .collect();
        let query: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();

        let mut expected: Vec<(OrderedFloat<f32>, usize)> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (OrderedFloat(distance::l2_distance(&query, r)), i))
            .collect();
        expected.sort();
        let expected: Vec<usize> = expected.iter().take(10).map(|(_, i)| *i).collect();

        let features = rows.into_iter().map(|r| FeatureVector::Dense(Vector::new(r))).collect();
        let index = VectorIndex::build(features, dim, Metric::Euclidean).unwrap();
        let results = index
            .nearest(&FeatureVector::Dense(Vector::new(query)), 10)
            .unwrap();
        assert_eq!(ids(&results), expected);
    }

    #[test]
    fn test_matrix_lookup() {
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.2, 0.9],
            vec![0.9, 1.0, 0.1, 0.3],
            vec![0.2, 0.1, 1.0, 0.5],
            vec![0.9, 0.3, 0.5, 1.0],
        ])
        .unwrap();
        let index = MatrixIndex::new(matrix);

        let results = index.query(0, 2).unwrap();
        assert_eq!(ids(&results), vec![0, 1, 3]);
        assert_eq!(results[1].score, 0.9);

        assert!(matches!(index.nearest(9, 2), Err(Error::NotFound(_))));
        assert!(index.query(0, 4).is_err());
    }
}
