//! Scoring an imputation against the entries that were corrupted.

use ndarray::ArrayView2;
use sceval_core::{Result, SceError};
use sceval_stats::median;

use crate::corrupt::CorruptionSites;

/// Median absolute difference between `original` and `imputed`, evaluated only
/// at the corrupted coordinates in `sites`.
///
/// # Errors
///
/// Returns an error if the matrices differ in shape, `sites` selects no entry,
/// or any selected coordinate lies outside the matrices.
pub fn imputation_error(
    original: ArrayView2<'_, f64>,
    imputed: ArrayView2<'_, f64>,
    sites: &CorruptionSites,
) -> Result<f64> {
    if original.dim() != imputed.dim() {
        return Err(SceError::InvalidInput(format!(
            "original shape {:?} != imputed shape {:?}",
            original.dim(),
            imputed.dim()
        )));
    }
    if sites.is_empty() {
        return Err(SceError::InvalidInput(
            "no corrupted entries to evaluate".into(),
        ));
    }

    let (n_rows, n_cols) = original.dim();
    let diffs = sites
        .coordinates()
        .map(|(r, c)| {
            if r >= n_rows || c >= n_cols {
                return Err(SceError::InvalidInput(format!(
                    "coordinate ({}, {}) out of bounds for {}x{} matrix",
                    r, c, n_rows, n_cols
                )));
            }
            Ok((original[[r, c]] - imputed[[r, c]]).abs())
        })
        .collect::<Result<Vec<f64>>>()?;

    median(&diffs)
}
