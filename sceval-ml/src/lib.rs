//! Clustering and neighborhood primitives for single-cell evaluation.
//!
//! - **Clustering** — multi-restart k-means ([`kmeans`])
//! - **Evaluation** — silhouette coefficient, NMI, confusion matrix
//! - **Neighbors** — exact Euclidean [`KnnGraph`]
//! - **Quality** — [`silhouette_sweep`] over k = 2..=9 and
//!   [`cluster_quality`] against ground-truth labels

pub mod cluster;
pub mod distance;
pub mod evaluate;
pub mod metrics;
pub mod neighbors;
pub mod quality;

pub use cluster::{kmeans, KMeansConfig, KMeansInit, KMeansResult};
pub use distance::{euclidean, validate_rows, DistanceMatrix};
pub use evaluate::{
    silhouette_samples, silhouette_samples_precomputed, silhouette_score,
    silhouette_score_precomputed,
};
pub use metrics::{
    cast_labels, mutual_info_score, normalized_mutual_info_score, ConfusionMatrix, NmiAverage,
};
pub use neighbors::KnnGraph;
pub use quality::{
    cluster_quality, silhouette_sweep, silhouette_sweep_range, ClusterQualityReport,
    SilhouetteSweep, SWEEP_CLUSTER_COUNTS,
};
