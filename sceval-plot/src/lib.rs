//! SVG charts for single-cell evaluation results.
//!
//! Every renderer returns the SVG document as a `String`; [`save_svg`] writes
//! one to disk.
//!
//! - **Line charts** — [`silhouette_plot_svg`], [`sweep_plot_svg`],
//!   [`loss_plot_svg`]
//! - **Heatmaps** — [`confusion_heatmap_svg`], [`render_cluster_quality`]

pub mod heatmap;
pub mod line;

use std::path::Path;

use sceval_core::{Result, SceError};
use tracing::debug;

pub use heatmap::{confusion_heatmap_svg, render_cluster_quality, HeatmapConfig};
pub use line::{loss_plot_svg, silhouette_plot_svg, sweep_plot_svg, LinePlotConfig};

/// Write a rendered SVG document to `path`.
pub fn save_svg(path: impl AsRef<Path>, svg: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, svg)?;
    debug!(path = %path.display(), bytes = svg.len(), "wrote chart");
    Ok(())
}

pub(crate) fn plot_err(e: impl std::fmt::Display) -> SceError {
    SceError::Plot(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_svg_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");
        let svg = loss_plot_svg(&[3.0, 2.0, 1.5], &LinePlotConfig::loss()).unwrap();
        save_svg(&path, &svg).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, svg);
    }

    #[test]
    fn save_svg_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("x.svg");
        let err = save_svg(&path, "<svg/>").unwrap_err();
        assert!(matches!(err, SceError::Io(_)));
    }
}
