use crate::{Error, Result};

/// Square all-pairs similarity table stored row-major in one contiguous buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Rows must be `rows.len()` long and hold only finite scores.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: row.len(),
                });
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(Error::InvalidValue(format!("similarity[{i}][{j}] is {}", row[j])));
            }
            data.extend_from_slice(&row);
        }
        Ok(Self { dim, data })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.dim {
            return None;
        }
        let start = i * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.row(i).and_then(|r| r.get(j).copied())
    }

    /// Largest `|M[i][j] - M[j][i]|` over the matrix
    pub fn max_asymmetry(&self) -> f32 {
        let mut worst = 0.0f32;
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                let a = self.data[i * self.dim + j];
                let b = self.data[j * self.dim + i];
                worst = worst.max((a - b).abs());
            }
        }
        worst
    }

    /// Rows whose diagonal entry is below some other entry of the row
    pub fn rows_with_weak_diagonal(&self) -> usize {
        (0..self.dim)
            .filter(|&i| {
                self.row(i)
                    .map(|row| row.iter().any(|&v| v > row[i]))
                    .unwrap_or(false)
            })
            .count()
    }
}
