//! Shannon entropy of abundance counts and categorical label vectors.

use std::collections::HashMap;
use std::hash::Hash;

use sceval_core::{Result, SceError};

/// Shannon diversity index H = -Σ p_i ln(p_i).
///
/// Uses natural logarithm. Zero counts contribute nothing.
///
/// # Errors
///
/// Returns an error if `counts` is empty or total is zero.
pub fn shannon_index(counts: &[usize]) -> Result<f64> {
    validate_counts(counts)?;
    let n: f64 = counts.iter().sum::<usize>() as f64;
    let mut h = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / n;
            h -= p * p.ln();
        }
    }
    Ok(h)
}

/// Count occurrences of each distinct label.
///
/// Only observed values get an entry, so every count is at least 1.
pub fn label_counts<T: Eq + Hash>(labels: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }
    counts
}

/// Shannon entropy (nats) of the empirical label distribution.
///
/// 0 when every label is identical, `ln(m)` when the labels are split evenly
/// across `m` categories.
///
/// # Errors
///
/// Returns an error if `labels` is empty.
pub fn label_entropy<T: Eq + Hash>(labels: &[T]) -> Result<f64> {
    if labels.is_empty() {
        return Err(SceError::InvalidInput(
            "label_entropy: labels must not be empty".into(),
        ));
    }
    // fixed summation order keeps the result bit-identical across calls
    let mut counts: Vec<usize> = label_counts(labels).into_values().collect();
    counts.sort_unstable();
    shannon_index(&counts)
}

fn validate_counts(counts: &[usize]) -> Result<()> {
    if counts.is_empty() {
        return Err(SceError::InvalidInput(
            "counts must be non-empty".into(),
        ));
    }
    let n: usize = counts.iter().sum();
    if n == 0 {
        return Err(SceError::InvalidInput(
            "total count must be greater than zero".into(),
        ));
    }
    Ok(())
}
