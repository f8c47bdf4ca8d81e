//! K-means clustering with multiple restarts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sceval_core::{Result, SceError, Summarizable};

use crate::distance::{sq_euclidean, validate_rows};

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KMeansInit {
    /// `k` distinct rows drawn uniformly at random.
    #[default]
    Random,
    /// k-means++ seeding (D² weighting).
    KMeansPlusPlus,
}

/// Configuration for k-means clustering.
///
/// Defaults: random initialization, 50 restarts, 400 Lloyd iterations,
/// seed 197.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansConfig {
    pub n_clusters: usize,
    pub init: KMeansInit,
    /// Number of independent restarts; the run with lowest inertia wins.
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 6,
            init: KMeansInit::Random,
            n_init: 50,
            max_iter: 400,
            tolerance: 1e-4,
            seed: 197,
        }
    }
}

impl KMeansConfig {
    /// Same configuration with a different cluster count.
    pub fn with_clusters(&self, n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..self.clone()
        }
    }
}

/// Result of k-means clustering.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansResult {
    /// Flat centroid data: `n_clusters * n_features` values.
    pub centroids: Vec<f64>,
    /// Cluster label for each data point.
    pub labels: Vec<usize>,
    /// Sum of squared distances to nearest centroid.
    pub inertia: f64,
    /// Number of Lloyd iterations run by the winning restart.
    pub n_iter: usize,
    /// Dimensionality of the data.
    pub n_features: usize,
}

impl KMeansResult {
    /// Number of clusters (centroids) in the fit.
    pub fn n_clusters(&self) -> usize {
        if self.n_features > 0 {
            self.centroids.len() / self.n_features
        } else {
            0
        }
    }
}

impl Summarizable for KMeansResult {
    fn summary(&self) -> String {
        format!(
            "KMeans: k={}, inertia={:.4}, iterations={}",
            self.n_clusters(),
            self.inertia,
            self.n_iter,
        )
    }
}

/// Run k-means clustering on the given data points.
///
/// Runs Lloyd's algorithm `n_init` times from independent initializations and
/// keeps the run with the lowest inertia.
pub fn kmeans(data: &[&[f64]], config: &KMeansConfig) -> Result<KMeansResult> {
    let n = data.len();
    let k = config.n_clusters;

    let dim = validate_rows(data)?;
    if k == 0 {
        return Err(SceError::InvalidInput(
            "n_clusters must be > 0".into(),
        ));
    }
    if k > n {
        return Err(SceError::InvalidInput(format!(
            "n_clusters ({}) > n_samples ({})",
            k, n
        )));
    }
    if config.n_init == 0 {
        return Err(SceError::InvalidInput("n_init must be > 0".into()));
    }
    if config.max_iter == 0 {
        return Err(SceError::InvalidInput("max_iter must be > 0".into()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansResult> = None;

    for _ in 0..config.n_init {
        let centroids = match config.init {
            KMeansInit::Random => init_random(data, k, dim, &mut rng),
            KMeansInit::KMeansPlusPlus => init_plus_plus(data, k, dim, &mut rng),
        };
        let run = lloyd(data, centroids, k, dim, config);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    best.ok_or_else(|| SceError::Other("k-means produced no run".into()))
}

fn init_random(data: &[&[f64]], k: usize, dim: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut centroids = Vec::with_capacity(k * dim);
    for idx in rand::seq::index::sample(rng, data.len(), k) {
        centroids.extend_from_slice(data[idx]);
    }
    centroids
}

fn init_plus_plus(data: &[&[f64]], k: usize, dim: usize, rng: &mut StdRng) -> Vec<f64> {
    let n = data.len();
    let mut centroids = vec![0.0; k * dim];
    let first = rng.gen_range(0..n);
    centroids[..dim].copy_from_slice(data[first]);

    let mut dists = vec![f64::INFINITY; n];
    for c in 1..k {
        // Min distance from each point to the centroids chosen so far
        let prev = &centroids[(c - 1) * dim..c * dim];
        for (i, row) in data.iter().enumerate() {
            let d = sq_euclidean(row, prev);
            if d < dists[i] {
                dists[i] = d;
            }
        }
        let total: f64 = dists.iter().sum();
        let chosen = if total == 0.0 {
            // All points coincide with existing centroids
            c % n
        } else {
            let threshold = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n - 1;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if cumulative >= threshold {
                    chosen = i;
                    break;
                }
            }
            chosen
        };
        centroids[c * dim..(c + 1) * dim].copy_from_slice(data[chosen]);
    }
    centroids
}

fn lloyd(
    data: &[&[f64]],
    mut centroids: Vec<f64>,
    k: usize,
    dim: usize,
    config: &KMeansConfig,
) -> KMeansResult {
    let n = data.len();
    let mut labels = vec![0usize; n];
    let mut n_iter = 0;

    for _iter in 0..config.max_iter {
        n_iter += 1;

        assign(data, &centroids, k, dim, &mut labels);

        // Update centroids
        let mut new_centroids = vec![0.0; k * dim];
        let mut counts = vec![0usize; k];
        for (row, &c) in data.iter().zip(&labels) {
            counts[c] += 1;
            for d in 0..dim {
                new_centroids[c * dim + d] += row[d];
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                let cnt = counts[c] as f64;
                for d in 0..dim {
                    new_centroids[c * dim + d] /= cnt;
                }
            } else {
                // Empty cluster: keep old centroid
                new_centroids[c * dim..(c + 1) * dim]
                    .copy_from_slice(&centroids[c * dim..(c + 1) * dim]);
            }
        }

        let max_shift = (0..k)
            .map(|c| {
                sq_euclidean(
                    &centroids[c * dim..(c + 1) * dim],
                    &new_centroids[c * dim..(c + 1) * dim],
                )
                .sqrt()
            })
            .fold(0.0_f64, f64::max);

        centroids = new_centroids;

        if max_shift < config.tolerance {
            break;
        }
    }

    // Final assignment against the converged centroids
    assign(data, &centroids, k, dim, &mut labels);
    let inertia = data
        .iter()
        .zip(&labels)
        .map(|(row, &c)| sq_euclidean(row, &centroids[c * dim..(c + 1) * dim]))
        .sum();

    KMeansResult {
        centroids,
        labels,
        inertia,
        n_iter,
        n_features: dim,
    }
}

fn assign(data: &[&[f64]], centroids: &[f64], k: usize, dim: usize, labels: &mut [usize]) {
    for (row, label) in data.iter().zip(labels.iter_mut()) {
        let mut best_dist = f64::INFINITY;
        let mut best_c = 0;
        for c in 0..k {
            let d = sq_euclidean(row, &centroids[c * dim..(c + 1) * dim]);
            if d < best_dist {
                best_dist = d;
                best_c = c;
            }
        }
        *label = best_c;
    }
}
