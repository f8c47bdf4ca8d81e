//! Synthetic corruption of count matrices for imputation benchmarking.
//!
//! A fraction of the nonzero entries is selected uniformly at random and
//! perturbed by one of two noise models:
//!
//! - **Uniform** zero introduction: each selected count `n` is multiplied by
//!   an independent Bernoulli(p) draw, so it is either kept or zeroed.
//! - **Binomial** thinning: each selected count `n` is replaced by a draw from
//!   Binomial(n, p).
//!
//! The returned [`CorruptionSites`] records where noise was applied so that
//! [`imputation_error`](crate::imputation::imputation_error) can score an
//! imputation at exactly those entries.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Binomial, Distribution};
use sceval_core::{Result, SceError, Summarizable};
use tracing::debug;

/// Noise model applied to the selected entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorruptionMethod {
    #[default]
    Uniform,
    Binomial,
}

impl FromStr for CorruptionMethod {
    type Err = SceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Uniform" => Ok(Self::Uniform),
            "Binomial" => Ok(Self::Binomial),
            other => Err(SceError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CorruptionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("Uniform"),
            Self::Binomial => f.write_str("Binomial"),
        }
    }
}

/// Configuration for [`corrupt`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorruptionConfig {
    /// Success probability of the Bernoulli / Binomial draw, in `[0, 1]`.
    pub p: f64,
    pub method: CorruptionMethod,
    /// Fraction of nonzero entries to corrupt, in `(0, 1]`.
    pub percentage: f64,
    /// Seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self {
            p: 0.10,
            method: CorruptionMethod::Uniform,
            percentage: 0.10,
            seed: None,
        }
    }
}

/// Coordinates of the corrupted entries.
///
/// `rows[i], cols[i]` enumerate every nonzero entry of the original matrix in
/// row-major order; `selected` indexes into those two vectors (not into the
/// matrix) and names the entries that were perturbed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorruptionSites {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub selected: Vec<usize>,
}

impl CorruptionSites {
    /// Assemble sites from separate coordinate arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` and `cols` differ in length or any entry of
    /// `selected` is out of range for them.
    pub fn new(rows: Vec<usize>, cols: Vec<usize>, selected: Vec<usize>) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(SceError::InvalidInput(format!(
                "row coordinates ({}) and column coordinates ({}) differ in length",
                rows.len(),
                cols.len()
            )));
        }
        if let Some(&bad) = selected.iter().find(|&&s| s >= rows.len()) {
            return Err(SceError::InvalidInput(format!(
                "selected index {} out of range for {} coordinates",
                bad,
                rows.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            selected,
        })
    }

    /// Number of corrupted entries.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether no entry was corrupted.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// `(row, col)` matrix coordinates of the corrupted entries.
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.selected.iter().map(|&s| (self.rows[s], self.cols[s]))
    }
}

/// A corrupted matrix together with the sites that were perturbed.
#[derive(Debug, Clone)]
pub struct Corrupted {
    pub data: Array2<f64>,
    pub sites: CorruptionSites,
}

impl Summarizable for Corrupted {
    fn summary(&self) -> String {
        let (r, c) = self.data.dim();
        format!(
            "Corrupted: {}x{} matrix, {} of {} nonzero entries perturbed",
            r,
            c,
            self.sites.len(),
            self.sites.rows.len()
        )
    }
}

/// Corrupt a count matrix according to `config`.
///
/// Entries are truncated to integer counts first; noise is applied to
/// `floor(percentage * nnz)` nonzero entries chosen without replacement.
///
/// # Errors
///
/// Returns an error if `p` or `percentage` is out of range, or the matrix
/// contains negative or non-finite values.
pub fn corrupt(data: ArrayView2<'_, f64>, config: &CorruptionConfig) -> Result<Corrupted> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    corrupt_with_rng(data, config, &mut rng)
}

/// [`corrupt`] with a caller-supplied random source.
pub fn corrupt_with_rng<R: Rng + ?Sized>(
    data: ArrayView2<'_, f64>,
    config: &CorruptionConfig,
    rng: &mut R,
) -> Result<Corrupted> {
    if !(0.0..=1.0).contains(&config.p) {
        return Err(SceError::InvalidInput(format!(
            "p must be in [0, 1], got {}",
            config.p
        )));
    }
    if !(config.percentage > 0.0 && config.percentage <= 1.0) {
        return Err(SceError::InvalidInput(format!(
            "percentage must be in (0, 1], got {}",
            config.percentage
        )));
    }
    if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(SceError::InvalidInput(format!(
            "count matrix must be non-negative and finite, found {}",
            bad
        )));
    }

    let mut counts: Array2<u64> = data.mapv(|v| v.trunc() as u64);

    let (rows, cols): (Vec<usize>, Vec<usize>) = counts
        .indexed_iter()
        .filter(|(_, &v)| v > 0)
        .map(|((r, c), _)| (r, c))
        .unzip();
    let nnz = rows.len();
    let n_select = (config.percentage * nnz as f64).floor() as usize;
    let selected = rand::seq::index::sample(rng, nnz, n_select).into_vec();
    debug!(
        nnz,
        n_select,
        method = %config.method,
        p = config.p,
        "corrupting count matrix"
    );

    match config.method {
        CorruptionMethod::Uniform => {
            let keep = Bernoulli::new(config.p)
                .map_err(|e| SceError::InvalidInput(format!("Bernoulli({}): {}", config.p, e)))?;
            for &s in &selected {
                if !keep.sample(rng) {
                    counts[[rows[s], cols[s]]] = 0;
                }
            }
        }
        CorruptionMethod::Binomial => {
            for &s in &selected {
                let cell = &mut counts[[rows[s], cols[s]]];
                let thin = Binomial::new(*cell, config.p).map_err(|e| {
                    SceError::InvalidInput(format!("Binomial({}, {}): {}", *cell, config.p, e))
                })?;
                *cell = thin.sample(rng);
            }
        }
    }

    Ok(Corrupted {
        data: counts.mapv(|v| v as f64),
        sites: CorruptionSites {
            rows,
            cols,
            selected,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn seeded(method: CorruptionMethod, p: f64) -> CorruptionConfig {
        CorruptionConfig {
            p,
            method,
            seed: Some(197),
            ..Default::default()
        }
    }

    #[test]
    fn parse_methods() {
        assert_eq!("Uniform".parse::<CorruptionMethod>().unwrap(), CorruptionMethod::Uniform);
        assert_eq!("Binomial".parse::<CorruptionMethod>().unwrap(), CorruptionMethod::Binomial);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "Gaussian".parse::<CorruptionMethod>().unwrap_err();
        assert!(matches!(err, SceError::UnsupportedMethod { ref method } if method == "Gaussian"));
        let msg = err.to_string();
        assert!(msg.contains("Uniform") && msg.contains("Binomial"));
    }

    #[test]
    fn binomial_all_ones_selects_ten_percent() {
        let data = Array2::<f64>::ones((100, 50));
        let out = corrupt(data.view(), &seeded(CorruptionMethod::Binomial, 0.2)).unwrap();
        assert_eq!(out.sites.rows.len(), 5000);
        assert_eq!(out.sites.len(), 500);

        let mut touched = Array2::<bool>::from_elem((100, 50), false);
        for (r, c) in out.sites.coordinates() {
            touched[[r, c]] = true;
            let v = out.data[[r, c]];
            assert!(v == 0.0 || v == 1.0);
        }
        for ((r, c), &v) in out.data.indexed_iter() {
            if !touched[[r, c]] {
                assert_eq!(v, 1.0);
            }
        }
    }

    #[test]
    fn uniform_only_keeps_or_zeroes_selected() {
        let data = Array2::from_shape_fn((30, 20), |(r, c)| ((r * 7 + c * 3) % 5) as f64);
        let out = corrupt(data.view(), &seeded(CorruptionMethod::Uniform, 0.5)).unwrap();

        let mut touched = Array2::<bool>::from_elem((30, 20), false);
        for (r, c) in out.sites.coordinates() {
            touched[[r, c]] = true;
        }
        for ((r, c), &v) in out.data.indexed_iter() {
            let orig = data[[r, c]];
            if touched[[r, c]] {
                assert!(v == orig || v == 0.0);
            } else {
                assert_eq!(v, orig);
            }
        }
    }

    #[test]
    fn uniform_draws_are_per_entry() {
        let data = Array2::<f64>::from_elem((40, 50), 3.0);
        let out = corrupt(data.view(), &seeded(CorruptionMethod::Uniform, 0.5)).unwrap();
        let zeroed = out.sites.coordinates().filter(|&(r, c)| out.data[[r, c]] == 0.0).count();
        // 200 independent fair coins: all-or-nothing would be 0 or 200
        assert!(zeroed > 0 && zeroed < out.sites.len(), "zeroed = {}", zeroed);
    }

    #[test]
    fn selected_entries_are_nonzero_in_original() {
        let data = Array2::from_shape_fn((25, 25), |(r, c)| if (r + c) % 3 == 0 { 4.0 } else { 0.0 });
        let out = corrupt(data.view(), &seeded(CorruptionMethod::Binomial, 0.3)).unwrap();
        for (r, c) in out.sites.coordinates() {
            assert!(data[[r, c]] > 0.0);
        }
        let mut sel = out.sites.selected.clone();
        sel.sort_unstable();
        sel.dedup();
        assert_eq!(sel.len(), out.sites.len());
    }

    #[test]
    fn percentage_controls_fraction() {
        let data = Array2::<f64>::ones((10, 10));
        let config = CorruptionConfig {
            percentage: 0.25,
            ..seeded(CorruptionMethod::Uniform, 0.9)
        };
        let out = corrupt(data.view(), &config).unwrap();
        assert_eq!(out.sites.len(), 25);
    }

    #[test]
    fn counts_are_truncated() {
        let data = Array2::from_shape_vec((1, 3), vec![2.7, 0.4, 1.0]).unwrap();
        let config = CorruptionConfig {
            percentage: 0.5,
            ..seeded(CorruptionMethod::Uniform, 1.0)
        };
        let out = corrupt(data.view(), &config).unwrap();
        assert_eq!(out.sites.rows.len(), 2);
        assert_eq!(out.data.row(0).to_vec(), vec![2.0, 0.0, 1.0]);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let data = Array2::from_shape_fn((20, 20), |(r, c)| ((r + c) % 4) as f64);
        let config = seeded(CorruptionMethod::Binomial, 0.4);
        let a = corrupt(data.view(), &config).unwrap();
        let b = corrupt(data.view(), &config).unwrap();
        assert_eq!(a.sites, b.sites);
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn invalid_parameters() {
        let data = Array2::<f64>::ones((3, 3));
        assert!(corrupt(data.view(), &seeded(CorruptionMethod::Uniform, 1.5)).is_err());
        let zero_pct = CorruptionConfig {
            percentage: 0.0,
            ..Default::default()
        };
        assert!(corrupt(data.view(), &zero_pct).is_err());
        let negative = Array2::from_elem((2, 2), -1.0);
        assert!(corrupt(negative.view(), &CorruptionConfig::default()).is_err());
    }

    #[test]
    fn sites_new_validates() {
        assert!(CorruptionSites::new(vec![0, 1], vec![0], vec![]).is_err());
        assert!(CorruptionSites::new(vec![0, 1], vec![0, 1], vec![2]).is_err());
        let sites = CorruptionSites::new(vec![0, 1], vec![3, 4], vec![1]).unwrap();
        assert_eq!(sites.coordinates().collect::<Vec<_>>(), vec![(1, 4)]);
    }

    #[test]
    fn summary_reports_counts() {
        let data = Array2::<f64>::ones((10, 10));
        let out = corrupt(data.view(), &seeded(CorruptionMethod::Uniform, 0.1)).unwrap();
        assert_eq!(
            out.summary(),
            "Corrupted: 10x10 matrix, 10 of 100 nonzero entries perturbed"
        );
    }
}
