//! Descriptive statistics for numeric data.

use sceval_core::{Result, SceError};

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(SceError::InvalidInput(
            "mean: data must not be empty".into(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Median (50th percentile).
///
/// For an even number of observations this is the average of the two middle
/// values.
pub fn median(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(SceError::InvalidInput(
            "median: data must not be empty".into(),
        ));
    }
    quantile(data, 0.5)
}

/// Quantile `q` in `[0, 1]` with linear interpolation between order statistics.
pub fn quantile(data: &[f64], q: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(SceError::InvalidInput(
            "quantile: data must not be empty".into(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(SceError::InvalidInput(format!(
            "quantile: q must be in [0, 1], got {}",
            q
        )));
    }
    if data.iter().any(|x| x.is_nan()) {
        return Err(SceError::InvalidInput(
            "quantile: data contains NaN".into(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(compute_quantile_sorted(&sorted, q))
}

fn compute_quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = lo + 1;
    let frac = pos - lo as f64;
    if hi >= n {
        sorted[n - 1]
    } else {
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn mean_basic() {
        assert!((mean(&[2.0, 4.0, 6.0]).unwrap() - 4.0).abs() < TOL);
    }

    #[test]
    fn mean_empty() {
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn median_odd() {
        assert!((median(&[3.0, 1.0, 2.0]).unwrap() - 2.0).abs() < TOL);
    }

    #[test]
    fn median_even() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]).unwrap() - 2.5).abs() < TOL);
    }

    #[test]
    fn median_single() {
        assert!((median(&[7.5]).unwrap() - 7.5).abs() < TOL);
    }

    #[test]
    fn median_empty() {
        let err = median(&[]).unwrap_err();
        assert!(err.to_string().contains("median"));
    }

    #[test]
    fn quantile_bounds() {
        let data = [5.0, 1.0, 3.0];
        assert!((quantile(&data, 0.0).unwrap() - 1.0).abs() < TOL);
        assert!((quantile(&data, 1.0).unwrap() - 5.0).abs() < TOL);
        assert!(quantile(&data, 1.5).is_err());
    }

    #[test]
    fn quantile_rejects_nan() {
        assert!(quantile(&[1.0, f64::NAN], 0.5).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn median_within_range(data in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
            let m = median(&data).unwrap();
            let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m >= lo && m <= hi);
        }
    }
}
