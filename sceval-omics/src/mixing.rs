//! Batch mixing diagnostics in a latent space.
//!
//! The batch mixing score (Haghverdi et al. 2018; Lopez et al. 2018) samples
//! cells, looks at the batch labels of their nearest neighbors in the
//! embedding, and averages the Shannon entropy of those labels. Higher is
//! better mixed; 0 means every neighborhood is batch-pure.

use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sceval_core::{Result, SceError};
use sceval_ml::KnnGraph;
use sceval_stats::label_entropy;
use tracing::{debug, info};

/// Configuration for [`batch_mixing_score`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchMixingConfig {
    /// Neighbors per sampled cell (self excluded).
    pub n_neighbors: usize,
    /// Worker threads for the neighbor search (`parallel` feature only).
    pub n_jobs: usize,
    /// Cells sampled per iteration, with replacement.
    pub n_samples: usize,
    /// Number of sampling iterations averaged.
    pub n_iter: usize,
    /// Seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BatchMixingConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 50,
            n_jobs: 8,
            n_samples: 100,
            n_iter: 50,
            seed: None,
        }
    }
}

/// Shannon entropy (nats) of a set of batch labels.
///
/// Frequencies are taken over observed labels only. 0 when all labels agree,
/// `ln(m)` for an even split across `m` batches.
pub fn batch_entropy<T: Eq + Hash>(batches: &[T]) -> Result<f64> {
    label_entropy(batches)
}

/// Mean neighborhood batch entropy, averaged over repeated random subsamples.
///
/// Each of `n_iter` iterations draws `n_samples` row indices uniformly with
/// replacement, independently of the other iterations, so `n_samples` may
/// exceed the number of rows. The result lies in `[0, ln(n_batches)]`.
///
/// # Errors
///
/// Returns an error if `batches` is not aligned with `latent`, any count
/// parameter is zero, or `n_neighbors >= latent.len()`.
pub fn batch_mixing_score<T: Eq + Hash>(
    latent: &[&[f64]],
    batches: &[T],
    config: &BatchMixingConfig,
) -> Result<f64> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    batch_mixing_score_with_rng(latent, batches, config, &mut rng)
}

/// [`batch_mixing_score`] with a caller-supplied random source.
pub fn batch_mixing_score_with_rng<T: Eq + Hash, R: Rng + ?Sized>(
    latent: &[&[f64]],
    batches: &[T],
    config: &BatchMixingConfig,
    rng: &mut R,
) -> Result<f64> {
    if latent.len() != batches.len() {
        return Err(SceError::InvalidInput(format!(
            "latent space has {} rows but {} batch labels were given",
            latent.len(),
            batches.len()
        )));
    }
    if config.n_samples == 0 {
        return Err(SceError::InvalidInput("n_samples must be > 0".into()));
    }
    if config.n_iter == 0 {
        return Err(SceError::InvalidInput("n_iter must be > 0".into()));
    }

    let graph = KnnGraph::build(latent, config.n_neighbors, config.n_jobs)?;
    let n_obs = graph.n_points();

    let mut total = 0.0;
    for iter in 0..config.n_iter {
        let mut iter_sum = 0.0;
        for _ in 0..config.n_samples {
            let cell = rng.gen_range(0..n_obs);
            let labels: Vec<&T> = graph.neighbor_indices(cell).map(|j| &batches[j]).collect();
            iter_sum += batch_entropy(&labels)?;
        }
        let iter_mean = iter_sum / config.n_samples as f64;
        debug!(iter, entropy = iter_mean, "batch mixing iteration");
        total += iter_mean;
    }

    let score = total / config.n_iter as f64;
    info!(
        score,
        n_neighbors = config.n_neighbors,
        n_iter = config.n_iter,
        "batch mixing entropy"
    );
    Ok(score)
}
