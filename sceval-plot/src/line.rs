//! Line charts: silhouette score per cluster count and training loss curves.

use plotters::prelude::*;
use sceval_core::{Result, SceError};
use sceval_ml::{SilhouetteSweep, SWEEP_CLUSTER_COUNTS};

use crate::plot_err;

/// Axis labels, title and canvas size of a line chart.
#[derive(Debug, Clone)]
pub struct LinePlotConfig {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl LinePlotConfig {
    /// Labels for a silhouette sweep.
    pub fn silhouette() -> Self {
        Self {
            title: None,
            x_label: "Number of Clusters".into(),
            y_label: "Silhouette Coefficient".into(),
            width: 800,
            height: 600,
        }
    }

    /// Labels for a training loss curve.
    pub fn loss() -> Self {
        Self {
            title: None,
            x_label: "Epoch".into(),
            y_label: "Neg-Loglikelihood".into(),
            width: 800,
            height: 600,
        }
    }
}

impl Default for LinePlotConfig {
    fn default() -> Self {
        Self::loss()
    }
}

/// Silhouette coefficient against cluster count for k = 2..=9.
///
/// # Errors
///
/// Returns an error unless exactly one score per cluster count is given.
pub fn silhouette_plot_svg(scores: &[f64]) -> Result<String> {
    let k_values: Vec<usize> = SWEEP_CLUSTER_COUNTS.collect();
    if scores.len() != k_values.len() {
        return Err(SceError::InvalidInput(format!(
            "expected {} silhouette scores (k = {}..={}), got {}",
            k_values.len(),
            SWEEP_CLUSTER_COUNTS.start(),
            SWEEP_CLUSTER_COUNTS.end(),
            scores.len()
        )));
    }
    render_silhouette(&k_values, scores, &LinePlotConfig::silhouette())
}

/// Silhouette chart for a sweep over any range of cluster counts.
pub fn sweep_plot_svg(sweep: &SilhouetteSweep, config: &LinePlotConfig) -> Result<String> {
    if sweep.k_values.len() != sweep.scores.len() {
        return Err(SceError::InvalidInput(
            "sweep k values and scores differ in length".into(),
        ));
    }
    render_silhouette(&sweep.k_values, &sweep.scores, config)
}

fn render_silhouette(k_values: &[usize], scores: &[f64], config: &LinePlotConfig) -> Result<String> {
    let points: Vec<(i32, f64)> = k_values
        .iter()
        .zip(scores)
        .map(|(&k, &s)| (k as i32, s))
        .collect();
    let (lo, hi) = match (k_values.first(), k_values.last()) {
        (Some(&lo), Some(&hi)) => (lo as i32, hi as i32),
        _ => return Err(SceError::InvalidInput("no silhouette scores to plot".into())),
    };
    // one tick per cluster count
    render_line(&points, lo, hi.max(lo + 1), k_values.len(), config)
}

/// Loss value against epoch index.
///
/// # Errors
///
/// Returns an error if `losses` is empty or contains non-finite values.
pub fn loss_plot_svg(losses: &[f64], config: &LinePlotConfig) -> Result<String> {
    if losses.is_empty() {
        return Err(SceError::InvalidInput("no losses to plot".into()));
    }
    let points: Vec<(i32, f64)> = losses
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as i32, v))
        .collect();
    let last = (losses.len() - 1).max(1) as i32;
    render_line(&points, 0, last, losses.len().min(10), config)
}

fn render_line(
    points: &[(i32, f64)],
    x_lo: i32,
    x_hi: i32,
    n_x_labels: usize,
    config: &LinePlotConfig,
) -> Result<String> {
    let (y_lo, y_hi) = padded_bounds(points.iter().map(|p| p.1))?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70);
        if let Some(title) = &config.title {
            builder.caption(title, ("sans-serif", 24));
        }
        let mut chart = builder
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc(config.x_label.as_str())
            .y_desc(config.y_label.as_str())
            .x_labels(n_x_labels)
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    Ok(svg)
}

/// Value range with 5% headroom on both sides; flat series get ±0.5.
fn padded_bounds(values: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        if !v.is_finite() {
            return Err(SceError::InvalidInput(format!(
                "cannot plot non-finite value {}",
                v
            )));
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        return Err(SceError::InvalidInput("no values to plot".into()));
    }
    let span = hi - lo;
    if span == 0.0 {
        return Ok((lo - 0.5, hi + 0.5));
    }
    Ok((lo - 0.05 * span, hi + 0.05 * span))
}
