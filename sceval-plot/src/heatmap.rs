//! Annotated confusion-matrix heatmap.
//!
//! Rows are ground-truth classes (first class at the top), columns are
//! predicted clusters. Tick labels are 1-indexed positions into
//! [`ConfusionMatrix::classes`].

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use sceval_core::{Result, SceError};
use sceval_ml::{ClusterQualityReport, ConfusionMatrix};
use tracing::debug;

use crate::plot_err;

const LOW: (u8, u8, u8) = (247, 251, 255);
const HIGH: (u8, u8, u8) = (8, 48, 107);

/// Canvas and label settings for the heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            title: None,
            x_label: "Predicted".into(),
            y_label: "Ground Truth".into(),
            width: 700,
            height: 600,
        }
    }
}

/// Render `cm` as a heatmap with the count written in every cell.
pub fn confusion_heatmap_svg(cm: &ConfusionMatrix, config: &HeatmapConfig) -> Result<String> {
    let nc = cm.n_classes();
    if nc == 0 || cm.matrix.len() != nc * nc {
        return Err(SceError::InvalidInput(format!(
            "confusion matrix has {} cells for {} classes",
            cm.matrix.len(),
            nc
        )));
    }
    let max = cm.max_count().max(1) as f64;
    let extent = nc as f64 - 0.5;

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60);
        if let Some(title) = &config.title {
            builder.caption(title, ("sans-serif", 22));
        }
        let mut chart = builder
            .build_cartesian_2d(-0.5..extent, -0.5..extent)
            .map_err(plot_err)?;

        // y runs bottom-up, so row r sits at nc - 1 - r
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(config.x_label.as_str())
            .y_desc(config.y_label.as_str())
            .x_labels(nc + 1)
            .y_labels(nc + 1)
            .x_label_formatter(&|x| cell_tick(*x, nc, false))
            .y_label_formatter(&|y| cell_tick(*y, nc, true))
            .draw()
            .map_err(plot_err)?;

        for r in 0..nc {
            let y = (nc - 1 - r) as f64;
            for c in 0..nc {
                let x = c as f64;
                let count = cm.get(r, c);
                let t = count as f64 / max;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                        shade(t).filled(),
                    )))
                    .map_err(plot_err)?;

                let ink = if t > 0.5 { WHITE } else { BLACK };
                let style = ("sans-serif", 16)
                    .into_font()
                    .color(&ink)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                chart
                    .draw_series(std::iter::once(Text::new(count.to_string(), (x, y), style)))
                    .map_err(plot_err)?;
            }
        }

        root.present().map_err(plot_err)?;
    }
    debug!(classes = nc, total = cm.total(), "rendered confusion heatmap");
    Ok(svg)
}

/// Heatmap of a cluster-quality report with the NMI in the caption.
pub fn render_cluster_quality(report: &ClusterQualityReport) -> Result<String> {
    let config = HeatmapConfig {
        title: Some(format!("NMI = {:.4}", report.nmi)),
        ..HeatmapConfig::default()
    };
    confusion_heatmap_svg(&report.confusion, &config)
}

fn shade(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(LOW.0, HIGH.0), mix(LOW.1, HIGH.1), mix(LOW.2, HIGH.2))
}

/// Tick text for an axis position: the 1-indexed cell number at integer
/// positions inside the grid, blank elsewhere.
fn cell_tick(v: f64, nc: usize, flipped: bool) -> String {
    let rounded = v.round();
    if (v - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= nc as f64 {
        return String::new();
    }
    let pos = rounded as usize;
    let idx = if flipped { nc - 1 - pos } else { pos };
    (idx + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ConfusionMatrix {
        let actual = [0, 0, 0, 1, 1, 2, 2, 2];
        let predicted = [0, 0, 1, 1, 1, 2, 2, 0];
        ConfusionMatrix::from_labels(&actual, &predicted).unwrap()
    }

    /// Text content of every element, however the backend breaks lines.
    fn text_nodes(svg: &str) -> Vec<&str> {
        svg.split('<')
            .filter_map(|piece| piece.split_once('>').map(|(_, text)| text.trim()))
            .filter(|text| !text.is_empty())
            .collect()
    }

    #[test]
    fn heatmap_has_axis_titles() {
        let svg = confusion_heatmap_svg(&sample_matrix(), &HeatmapConfig::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        let texts = text_nodes(&svg);
        assert!(texts.contains(&"Predicted"));
        assert!(texts.contains(&"Ground Truth"));
    }

    #[test]
    fn heatmap_annotates_every_cell() {
        // counts [[5, 7], [11, 13]] stay clear of the 1-indexed tick labels
        let mut actual = Vec::new();
        let mut predicted = Vec::new();
        for (a, p, n) in [(0, 0, 5), (0, 1, 7), (1, 0, 11), (1, 1, 13)] {
            actual.extend(std::iter::repeat(a).take(n));
            predicted.extend(std::iter::repeat(p).take(n));
        }
        let cm = ConfusionMatrix::from_labels(&actual, &predicted).unwrap();
        let svg = confusion_heatmap_svg(&cm, &HeatmapConfig::default()).unwrap();
        let texts = text_nodes(&svg);
        for count in cm.matrix.iter() {
            let label = count.to_string();
            assert_eq!(
                texts.iter().filter(|&&t| t == label).count(),
                1,
                "count {} annotated once",
                count
            );
        }
    }

    #[test]
    fn quality_caption_carries_nmi() {
        let report = ClusterQualityReport {
            nmi: 0.5,
            confusion: sample_matrix(),
            predicted: vec![0, 0, 1, 1, 1, 2, 2, 0],
        };
        let svg = render_cluster_quality(&report).unwrap();
        assert!(svg.contains("NMI = 0.5000"));
    }

    #[test]
    fn rejects_malformed_matrix() {
        let cm = ConfusionMatrix {
            matrix: vec![1, 2, 3],
            classes: vec![0, 1],
        };
        assert!(confusion_heatmap_svg(&cm, &HeatmapConfig::default()).is_err());
    }

    #[test]
    fn ticks_are_one_indexed() {
        assert_eq!(cell_tick(0.0, 3, false), "1");
        assert_eq!(cell_tick(2.0, 3, false), "3");
        assert_eq!(cell_tick(0.5, 3, false), "");
        assert_eq!(cell_tick(-0.5, 3, false), "");
        // top row of the chart is the first ground-truth class
        assert_eq!(cell_tick(2.0, 3, true), "1");
        assert_eq!(cell_tick(0.0, 3, true), "3");
    }

    #[test]
    fn shade_endpoints() {
        assert_eq!(shade(0.0).rgb(), LOW);
        assert_eq!(shade(1.0).rgb(), HIGH);
    }
}
