//! Clustering quality: silhouette sweep over cluster counts and agreement
//! with ground-truth labels.

use std::ops::RangeInclusive;

use sceval_core::{Result, SceError, Summarizable};
use tracing::{debug, info};

use crate::cluster::{kmeans, KMeansConfig};
use crate::evaluate::silhouette_score;
use crate::metrics::{normalized_mutual_info_score, ConfusionMatrix, NmiAverage};

/// Cluster counts evaluated by [`silhouette_sweep`].
pub const SWEEP_CLUSTER_COUNTS: RangeInclusive<usize> = 2..=9;

/// Per-k results of a k-means sweep.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SilhouetteSweep {
    /// Cluster counts, increasing.
    pub k_values: Vec<usize>,
    /// Mean silhouette coefficient for each entry of `k_values`.
    pub scores: Vec<f64>,
    /// k-means inertia for each entry of `k_values`.
    pub inertias: Vec<f64>,
}

impl SilhouetteSweep {
    /// Cluster count with the highest silhouette.
    pub fn best_k(&self) -> Option<usize> {
        self.k_values
            .iter()
            .zip(&self.scores)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&k, _)| k)
    }
}

impl Summarizable for SilhouetteSweep {
    fn summary(&self) -> String {
        match self.best_k() {
            Some(k) => format!(
                "SilhouetteSweep: k={}..={}, best k={}",
                self.k_values[0],
                self.k_values[self.k_values.len() - 1],
                k
            ),
            None => "SilhouetteSweep: empty".into(),
        }
    }
}

/// Fit k-means for every k in [`SWEEP_CLUSTER_COUNTS`] and score each labeling
/// by its silhouette coefficient.
///
/// `config.n_clusters` is ignored; all other settings apply to every fit.
/// Returns exactly 8 scores, ordered by increasing k.
///
/// # Errors
///
/// Propagates k-means and silhouette errors, e.g. fewer than 10 samples.
pub fn silhouette_sweep(data: &[&[f64]], config: &KMeansConfig) -> Result<SilhouetteSweep> {
    silhouette_sweep_range(data, config, SWEEP_CLUSTER_COUNTS)
}

/// [`silhouette_sweep`] over an arbitrary range of cluster counts.
pub fn silhouette_sweep_range(
    data: &[&[f64]],
    config: &KMeansConfig,
    k_range: RangeInclusive<usize>,
) -> Result<SilhouetteSweep> {
    if k_range.is_empty() || *k_range.start() < 2 {
        return Err(SceError::InvalidInput(format!(
            "cluster count range must be non-empty and start at >= 2, got {:?}",
            k_range
        )));
    }
    let mut sweep = SilhouetteSweep {
        k_values: Vec::new(),
        scores: Vec::new(),
        inertias: Vec::new(),
    };
    for k in k_range {
        let fit = kmeans(data, &config.with_clusters(k))?;
        let score = silhouette_score(data, &fit.labels)?;
        debug!(k, silhouette = score, inertia = fit.inertia, "k-means sweep step");
        sweep.k_values.push(k);
        sweep.scores.push(score);
        sweep.inertias.push(fit.inertia);
    }
    Ok(sweep)
}

/// Agreement between a k-means partition and ground-truth labels.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterQualityReport {
    /// Normalized mutual information (arithmetic normalization).
    pub nmi: f64,
    /// Rows = ground truth, columns = predicted cluster.
    pub confusion: ConfusionMatrix,
    /// k-means label per sample.
    pub predicted: Vec<usize>,
}

impl Summarizable for ClusterQualityReport {
    fn summary(&self) -> String {
        format!(
            "ClusterQuality: NMI={:.4}, {} classes, {} samples",
            self.nmi,
            self.confusion.n_classes(),
            self.predicted.len()
        )
    }
}

/// Cluster `data` into `config.n_clusters` groups and compare against
/// `ground_truth` with NMI and a confusion matrix.
///
/// The NMI is logged at info level and returned in the report.
///
/// # Errors
///
/// Returns an error if `ground_truth` does not have one label per row, or
/// propagates k-means failures.
pub fn cluster_quality(
    data: &[&[f64]],
    ground_truth: &[usize],
    config: &KMeansConfig,
) -> Result<ClusterQualityReport> {
    if ground_truth.len() != data.len() {
        return Err(SceError::InvalidInput(format!(
            "ground truth has {} labels for {} samples",
            ground_truth.len(),
            data.len()
        )));
    }
    let fit = kmeans(data, config)?;
    let nmi = normalized_mutual_info_score(ground_truth, &fit.labels, NmiAverage::Arithmetic)?;
    info!(nmi, n_clusters = config.n_clusters, "clustering quality");
    let confusion = ConfusionMatrix::from_labels(ground_truth, &fit.labels)?;

    Ok(ClusterQualityReport {
        nmi,
        confusion,
        predicted: fit.labels,
    })
}
