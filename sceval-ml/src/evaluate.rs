//! Cluster evaluation metrics.

use sceval_core::{Result, SceError};

use crate::distance::{sq_euclidean, validate_rows, DistanceMatrix};

/// Compute the silhouette coefficient for each sample.
///
/// Requires at least 2 distinct clusters. A sample alone in its cluster gets
/// a silhouette of 0.0.
///
/// Distances are computed one row at a time, so memory stays linear in the
/// number of samples. Use [`silhouette_samples_precomputed`] to reuse a
/// [`DistanceMatrix`] across several labelings of a small dataset.
pub fn silhouette_samples(data: &[&[f64]], labels: &[usize]) -> Result<Vec<f64>> {
    if data.len() != labels.len() {
        return Err(SceError::InvalidInput(
            "data and labels length mismatch".into(),
        ));
    }
    if data.len() < 2 {
        return Err(SceError::InvalidInput(
            "need at least 2 samples".into(),
        ));
    }
    validate_rows(data)?;
    silhouette_with(labels, |i, j| sq_euclidean(data[i], data[j]).sqrt())
}

/// [`silhouette_samples`] over an already computed distance matrix.
pub fn silhouette_samples_precomputed(
    distances: &DistanceMatrix,
    labels: &[usize],
) -> Result<Vec<f64>> {
    if distances.n() != labels.len() {
        return Err(SceError::InvalidInput(
            "distance matrix and labels length mismatch".into(),
        ));
    }
    silhouette_with(labels, |i, j| distances.get(i, j))
}

fn silhouette_with<D>(labels: &[usize], dist: D) -> Result<Vec<f64>>
where
    D: Fn(usize, usize) -> f64 + Sync,
{
    let n = labels.len();
    let n_labels = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0usize; n_labels];
    for &l in labels {
        sizes[l] += 1;
    }
    let n_clusters = sizes.iter().filter(|&&s| s > 0).count();
    if n_clusters < 2 {
        return Err(SceError::InvalidInput(
            "need at least 2 clusters".into(),
        ));
    }

    let sample = |i: usize| -> f64 {
        let own = labels[i];
        if sizes[own] <= 1 {
            return 0.0;
        }
        let mut sums = vec![0.0; n_labels];
        for j in 0..n {
            if j != i {
                sums[labels[j]] += dist(i, j);
            }
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..n_labels)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let max_ab = a.max(b);
        if max_ab == 0.0 {
            0.0
        } else {
            (b - a) / max_ab
        }
    };

    #[cfg(feature = "parallel")]
    let scores = {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(sample).collect::<Vec<f64>>()
    };
    #[cfg(not(feature = "parallel"))]
    let scores = (0..n).map(sample).collect::<Vec<f64>>();

    Ok(scores)
}

/// Mean silhouette score across all samples, in `[-1, 1]`.
///
/// See [`silhouette_samples`] for details.
pub fn silhouette_score(data: &[&[f64]], labels: &[usize]) -> Result<f64> {
    let samples = silhouette_samples(data, labels)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// [`silhouette_score`] over an already computed distance matrix.
pub fn silhouette_score_precomputed(distances: &DistanceMatrix, labels: &[usize]) -> Result<f64> {
    let samples = silhouette_samples_precomputed(distances, labels)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_refs(data: &[Vec<f64>]) -> Vec<&[f64]> {
        data.iter().map(|v| v.as_slice()).collect()
    }

    #[test]
    fn perfect_separation() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ];
        let refs = make_refs(&data);
        let labels = vec![0, 0, 0, 1, 1, 1];
        let score = silhouette_score(&refs, &labels).unwrap();
        assert!(score > 0.9, "expected high score, got {}", score);
    }

    #[test]
    fn swapped_labels_score_negative() {
        let data = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
        let refs = make_refs(&data);
        let labels = vec![0, 1, 0, 1];
        let score = silhouette_score(&refs, &labels).unwrap();
        assert!(score < 0.0, "expected negative score, got {}", score);
    }

    #[test]
    fn known_value() {
        // a = 1, b = mean(5, 6) = 5.5 for point 0 → s = 4.5 / 5.5
        let data = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0]];
        let refs = make_refs(&data);
        let samples = silhouette_samples(&refs, &[0, 0, 1, 1]).unwrap();
        assert!((samples[0] - 4.5 / 5.5).abs() < 1e-12);
    }

    #[test]
    fn singleton_cluster_is_zero() {
        let data = vec![vec![0.0], vec![1.0], vec![50.0]];
        let refs = make_refs(&data);
        let samples = silhouette_samples(&refs, &[0, 0, 1]).unwrap();
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn single_cluster_error() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        let refs = make_refs(&data);
        assert!(silhouette_score(&refs, &[0, 0, 0]).is_err());
    }

    #[test]
    fn value_range() {
        let data = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0]];
        let refs = make_refs(&data);
        let samples = silhouette_samples(&refs, &[0, 0, 1, 1]).unwrap();
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s), "silhouette {} out of range", s);
        }
    }

    #[test]
    fn precomputed_matches_direct() {
        let data = vec![vec![0.0, 1.0], vec![1.0, 0.5], vec![5.0, 4.0], vec![6.0, 6.0]];
        let refs = make_refs(&data);
        let labels = [0, 0, 1, 1];
        let dm = DistanceMatrix::from_points(&refs).unwrap();
        let direct = silhouette_score(&refs, &labels).unwrap();
        let pre = silhouette_score_precomputed(&dm, &labels).unwrap();
        assert!((direct - pre).abs() < 1e-12);
    }

    #[test]
    fn rowwise_matches_precomputed_per_sample() {
        let data: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i * 17 % 23) as f64, (i * 5 % 11) as f64 * 0.5, (i % 4) as f64])
            .collect();
        let refs = make_refs(&data);
        let labels: Vec<usize> = (0..60).map(|i| (i * 7) % 4).collect();
        let dm = DistanceMatrix::from_points(&refs).unwrap();
        let direct = silhouette_samples(&refs, &labels).unwrap();
        let pre = silhouette_samples_precomputed(&dm, &labels).unwrap();
        for (d, p) in direct.iter().zip(&pre) {
            assert!((d - p).abs() < 1e-12);
        }
    }

    #[test]
    fn ragged_rows_error() {
        let a = [0.0, 1.0];
        let b = [2.0];
        let refs: Vec<&[f64]> = vec![&a, &b];
        assert!(silhouette_samples(&refs, &[0, 1]).is_err());
    }

    #[test]
    fn length_mismatch_error() {
        let data = vec![vec![0.0], vec![1.0]];
        let refs = make_refs(&data);
        assert!(silhouette_samples(&refs, &[0]).is_err());
    }

    #[test]
    fn too_few_samples_error() {
        let data = vec![vec![0.0]];
        let refs = make_refs(&data);
        assert!(silhouette_samples(&refs, &[0]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn silhouette_in_unit_range(
            points in proptest::collection::vec(proptest::collection::vec(-50.0f64..50.0, 2), 4..30),
        ) {
            let refs: Vec<&[f64]> = points.iter().map(|v| v.as_slice()).collect();
            let labels: Vec<usize> = (0..refs.len()).map(|i| i % 2).collect();
            let s = silhouette_score(&refs, &labels).unwrap();
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }
}
