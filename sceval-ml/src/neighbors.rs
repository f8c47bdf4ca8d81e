//! Exact k-nearest-neighbor graph over row vectors.

use std::cmp::Ordering;

use sceval_core::{Result, SceError, Summarizable};

use crate::distance::{sq_euclidean, validate_rows};

/// Directed k-NN graph: for every point, its `k` nearest *other* points by
/// Euclidean distance, closest first.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnnGraph {
    k: usize,
    /// `neighbors[i]` holds `(j, distance)` pairs sorted by distance then index.
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl KnnGraph {
    /// Build the graph by exhaustive search.
    ///
    /// A point is never its own neighbor, even when duplicates of it exist.
    /// Ties are broken by the lower row index. `n_jobs` sets the worker count
    /// when the `parallel` feature is enabled and is ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or ragged, `k == 0`, or
    /// `k >= n_points`.
    pub fn build(data: &[&[f64]], k: usize, n_jobs: usize) -> Result<Self> {
        validate_rows(data)?;
        let n = data.len();
        if k == 0 {
            return Err(SceError::InvalidInput("k must be >= 1".into()));
        }
        if k >= n {
            return Err(SceError::InvalidInput(format!(
                "k ({}) must be less than number of points ({})",
                k, n
            )));
        }

        let nearest = |i: usize| -> Vec<(usize, f64)> {
            let mut dists: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, sq_euclidean(data[i], data[j])))
                .collect();
            dists.select_nth_unstable_by(k - 1, by_distance_then_index);
            dists.truncate(k);
            dists.sort_unstable_by(by_distance_then_index);
            dists.into_iter().map(|(j, d)| (j, d.sqrt())).collect()
        };

        #[cfg(feature = "parallel")]
        let neighbors = {
            use rayon::prelude::*;
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_jobs.max(1))
                .build()
                .map_err(|e| SceError::Other(format!("failed to start k-NN workers: {}", e)))?;
            pool.install(|| (0..n).into_par_iter().map(nearest).collect::<Vec<_>>())
        };
        #[cfg(not(feature = "parallel"))]
        let neighbors = {
            let _ = n_jobs;
            (0..n).map(nearest).collect::<Vec<_>>()
        };

        Ok(Self { k, neighbors })
    }

    /// Neighbors per point.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of points in the graph.
    pub fn n_points(&self) -> usize {
        self.neighbors.len()
    }

    /// `(index, distance)` pairs of the neighbors of point `i`, closest first.
    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.neighbors[i]
    }

    /// Neighbor indices of point `i`, closest first.
    pub fn neighbor_indices(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[i].iter().map(|&(j, _)| j)
    }
}

impl Summarizable for KnnGraph {
    fn summary(&self) -> String {
        format!("KnnGraph: {} points, k={}", self.n_points(), self.k)
    }
}

fn by_distance_then_index(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}
