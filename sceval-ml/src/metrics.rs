//! Agreement metrics between two label assignments.
//!
//! Provides a confusion matrix over arbitrary integer labels, mutual
//! information, and normalized mutual information (NMI) with the usual
//! normalizations.

use std::collections::BTreeMap;

use sceval_core::{Result, SceError};

// ---------------------------------------------------------------------------
// Confusion Matrix
// ---------------------------------------------------------------------------

/// Row-major confusion matrix between ground-truth and predicted labels.
///
/// Rows and columns are both indexed by `classes`, the sorted union of label
/// values seen in either vector. Entry `(i, j)` counts samples whose
/// **actual** label is `classes[i]` and **predicted** label is `classes[j]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    /// Row-major storage: `matrix[actual * n_classes + predicted]`.
    pub matrix: Vec<usize>,
    /// Sorted label values backing each row/column.
    pub classes: Vec<usize>,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from actual and predicted label vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices are empty or have different lengths.
    pub fn from_labels(actual: &[usize], predicted: &[usize]) -> Result<Self> {
        check_label_pair(actual, predicted)?;

        let mut classes: Vec<usize> = actual.iter().chain(predicted).copied().collect();
        classes.sort_unstable();
        classes.dedup();

        let index: BTreeMap<usize, usize> =
            classes.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let nc = classes.len();
        let mut matrix = vec![0usize; nc * nc];
        for (a, p) in actual.iter().zip(predicted) {
            matrix[index[a] * nc + index[p]] += 1;
        }

        Ok(Self { matrix, classes })
    }

    /// Number of classes (rows = columns).
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Get the count at row `actual`, column `predicted` (positional indices).
    #[inline]
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.matrix[actual * self.n_classes() + predicted]
    }

    /// One row of counts.
    pub fn row(&self, actual: usize) -> &[usize] {
        let nc = self.n_classes();
        &self.matrix[actual * nc..(actual + 1) * nc]
    }

    /// Largest cell count.
    pub fn max_count(&self) -> usize {
        self.matrix.iter().copied().max().unwrap_or(0)
    }

    /// Total number of samples.
    pub fn total(&self) -> usize {
        self.matrix.iter().sum()
    }

    /// Fraction of samples on the diagonal.
    ///
    /// Only meaningful when predicted labels share the ground-truth coding;
    /// cluster ids from k-means are arbitrary.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|c| self.get(c, c)).sum();
        correct as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// Mutual information
// ---------------------------------------------------------------------------

/// How the two label entropies are combined to normalize mutual information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NmiAverage {
    Min,
    Geometric,
    #[default]
    Arithmetic,
    Max,
}

impl NmiAverage {
    fn combine(self, u: f64, v: f64) -> f64 {
        match self {
            NmiAverage::Min => u.min(v),
            NmiAverage::Geometric => (u * v).sqrt(),
            NmiAverage::Arithmetic => (u + v) / 2.0,
            NmiAverage::Max => u.max(v),
        }
    }
}

/// Sparse contingency table between two label vectors.
struct Contingency {
    /// `(row, col) -> count` over compacted label indices.
    cells: BTreeMap<(usize, usize), usize>,
    row_sums: Vec<usize>,
    col_sums: Vec<usize>,
    n: usize,
}

impl Contingency {
    fn new(a: &[usize], b: &[usize]) -> Self {
        let rows = compact(a);
        let cols = compact(b);
        let n_rows = rows.iter().copied().max().map_or(0, |m| m + 1);
        let n_cols = cols.iter().copied().max().map_or(0, |m| m + 1);

        let mut cells = BTreeMap::new();
        let mut row_sums = vec![0usize; n_rows];
        let mut col_sums = vec![0usize; n_cols];
        for (&r, &c) in rows.iter().zip(&cols) {
            *cells.entry((r, c)).or_insert(0usize) += 1;
            row_sums[r] += 1;
            col_sums[c] += 1;
        }
        Self {
            cells,
            row_sums,
            col_sums,
            n: a.len(),
        }
    }

    fn mutual_information(&self) -> f64 {
        let n = self.n as f64;
        let mi: f64 = self
            .cells
            .iter()
            .map(|(&(r, c), &nij)| {
                let nij = nij as f64;
                let expected = self.row_sums[r] as f64 * self.col_sums[c] as f64;
                (nij / n) * (n * nij / expected).ln()
            })
            .sum();
        mi.max(0.0)
    }
}

/// Mutual information (nats) between two label assignments.
///
/// # Errors
///
/// Returns an error if the slices are empty or have different lengths.
pub fn mutual_info_score(labels_true: &[usize], labels_pred: &[usize]) -> Result<f64> {
    check_label_pair(labels_true, labels_pred)?;
    Ok(Contingency::new(labels_true, labels_pred).mutual_information())
}

/// Normalized mutual information between two label assignments.
///
/// Invariant to permutations of label values. 1.0 for identical partitions
/// (including two single-class assignments), 0.0 for independent ones.
///
/// # Errors
///
/// Returns an error if the slices are empty or have different lengths.
pub fn normalized_mutual_info_score(
    labels_true: &[usize],
    labels_pred: &[usize],
    average: NmiAverage,
) -> Result<f64> {
    check_label_pair(labels_true, labels_pred)?;
    let table = Contingency::new(labels_true, labels_pred);

    let n_true = table.row_sums.len();
    let n_pred = table.col_sums.len();
    if n_true == 1 && n_pred == 1 {
        return Ok(1.0);
    }

    let mi = table.mutual_information();
    if mi == 0.0 {
        return Ok(0.0);
    }

    let h_true = entropy_of_counts(&table.row_sums, table.n);
    let h_pred = entropy_of_counts(&table.col_sums, table.n);
    let normalizer = average.combine(h_true, h_pred).max(f64::EPSILON);
    Ok((mi / normalizer).min(1.0))
}

/// Cast floating-point labels to integer class ids by truncation.
///
/// # Errors
///
/// Returns an error for negative or non-finite values.
pub fn cast_labels(labels: &[f64]) -> Result<Vec<usize>> {
    labels
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if !v.is_finite() || v < 0.0 {
                Err(SceError::InvalidInput(format!(
                    "label {} at position {} is not a non-negative finite number",
                    v, i
                )))
            } else {
                Ok(v.trunc() as usize)
            }
        })
        .collect()
}

fn entropy_of_counts(counts: &[usize], n: usize) -> f64 {
    let n = n as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum()
}

/// Map arbitrary label values onto `0..n_distinct`, preserving sort order.
fn compact(labels: &[usize]) -> Vec<usize> {
    let mut uniq = labels.to_vec();
    uniq.sort_unstable();
    uniq.dedup();
    labels
        .iter()
        .map(|l| uniq.binary_search(l).unwrap_or_default())
        .collect()
}

fn check_label_pair(a: &[usize], b: &[usize]) -> Result<()> {
    if a.is_empty() {
        return Err(SceError::InvalidInput("empty label vectors".into()));
    }
    if a.len() != b.len() {
        return Err(SceError::InvalidInput(format!(
            "actual length {} != predicted length {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}
