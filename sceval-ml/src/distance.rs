//! Euclidean distances and pairwise distance matrices.

use sceval_core::{Result, SceError, Summarizable};

/// Euclidean (L2) distance between two vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    validate_pair(a, b)?;
    Ok(sq_euclidean(a, b).sqrt())
}

/// Squared Euclidean distance (no sqrt, no validation).
#[inline]
pub(crate) fn sq_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Check that `data` is a non-empty rectangular set of non-empty rows and
/// return the shared dimensionality.
pub fn validate_rows(data: &[&[f64]]) -> Result<usize> {
    if data.is_empty() {
        return Err(SceError::InvalidInput("empty data".into()));
    }
    let dim = data[0].len();
    if dim == 0 {
        return Err(SceError::InvalidInput("zero-dimensional data".into()));
    }
    for (i, row) in data.iter().enumerate() {
        if row.len() != dim {
            return Err(SceError::InvalidInput(format!(
                "point {} has dimension {}, expected {}",
                i,
                row.len(),
                dim
            )));
        }
    }
    Ok(dim)
}

/// Symmetric Euclidean distance matrix stored in condensed upper-triangle form.
///
/// For `n` points the condensed vector has `n*(n-1)/2` elements.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    condensed: Vec<f64>,
    n: usize,
}

impl DistanceMatrix {
    /// Build a distance matrix from row-vectors of points.
    pub fn from_points(data: &[&[f64]]) -> Result<Self> {
        let n = data.len();
        if n < 2 {
            return Err(SceError::InvalidInput(
                "need at least 2 points".into(),
            ));
        }
        validate_rows(data)?;
        #[cfg(feature = "parallel")]
        let condensed = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|i| {
                    ((i + 1)..n)
                        .map(|j| sq_euclidean(data[i], data[j]).sqrt())
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect::<Vec<f64>>()
        };
        #[cfg(not(feature = "parallel"))]
        let condensed = {
            let size = n * (n - 1) / 2;
            let mut condensed = Vec::with_capacity(size);
            for i in 0..n {
                for j in (i + 1)..n {
                    condensed.push(sq_euclidean(data[i], data[j]).sqrt());
                }
            }
            condensed
        };
        Ok(Self { condensed, n })
    }

    /// Get the distance between points `i` and `j`.
    ///
    /// Returns 0.0 when `i == j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.condensed[self.index(a, b)]
    }

    /// Number of points.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Map (i, j) where i < j to condensed index.
    fn index(&self, i: usize, j: usize) -> usize {
        // row i starts at position: i*n - i*(i+1)/2
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }
}

impl Summarizable for DistanceMatrix {
    fn summary(&self) -> String {
        format!("DistanceMatrix: {}x{}", self.n, self.n)
    }
}

fn validate_pair(a: &[f64], b: &[f64]) -> Result<()> {
    if a.is_empty() {
        return Err(SceError::InvalidInput("empty vectors".into()));
    }
    if a.len() != b.len() {
        return Err(SceError::InvalidInput(format!(
            "length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}
