//! Histogram chart of the numeric columns, rendered as SVG.

use crate::error::{AutoStatError, Result};
use crate::utils::{numeric_column_names, present_numeric_values};
use plotters::prelude::*;
use polars::prelude::*;

const PANEL_WIDTH: u32 = 420;
const PANEL_HEIGHT: u32 = 300;
const MAX_PANELS_PER_ROW: usize = 3;

/// Equal-width bin counts of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    /// `bins + 1` ascending edges. The last bin includes its upper edge.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the values into `bins` equal-width bins spanning their range.
    ///
    /// A constant column gets the range `value +/- 0.5`. `None` when there is
    /// no finite value or `bins` is zero.
    pub fn from_values(column: impl Into<String>, values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for value in finite {
            let index = (((value - lo) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        Some(Self {
            column: column.into(),
            edges,
            counts,
        })
    }

    /// Histogram of a numeric Series, ignoring missing cells.
    pub fn from_series(series: &Series, bins: usize) -> PolarsResult<Option<Self>> {
        let values = present_numeric_values(series)?;
        Ok(Self::from_values(series.name().as_str(), &values, bins))
    }

    /// One histogram per numeric column of a table.
    pub fn for_table(df: &DataFrame, bins: usize) -> PolarsResult<Vec<Self>> {
        let mut histograms = Vec::new();
        for name in numeric_column_names(df) {
            let series = df.column(&name)?.as_materialized_series();
            if let Some(histogram) = Self::from_series(series, bins)? {
                histograms.push(histogram);
            }
        }
        Ok(histograms)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Draw one panel per histogram into an SVG document.
pub fn render_svg(histograms: &[Histogram]) -> Result<String> {
    if histograms.is_empty() {
        return Err(AutoStatError::ReportGenerationFailed(
            "no numeric column to plot".to_string(),
        ));
    }

    let columns = histograms.len().min(MAX_PANELS_PER_ROW);
    let rows = histograms.len().div_ceil(columns);
    let size = (PANEL_WIDTH * columns as u32, PANEL_HEIGHT * rows as u32);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let panels = root.split_evenly((rows, columns));
        for (histogram, panel) in histograms.iter().zip(panels.iter()) {
            draw_panel(panel, histogram)?;
        }

        root.present().map_err(render_error)?;
    }

    Ok(svg)
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    histogram: &Histogram,
) -> Result<()> {
    let lo = histogram.edges.first().copied().unwrap_or(0.0);
    let hi = histogram.edges.last().copied().unwrap_or(1.0);
    let top = histogram.counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(&histogram.column, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(lo..hi, 0f64..top)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("count")
        .draw()
        .map_err(render_error)?;

    let bars = histogram
        .counts
        .iter()
        .zip(histogram.edges.windows(2))
        .map(|(count, edge)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], *count as f64)], BLUE.mix(0.6).filled())
        });
    chart.draw_series(bars).map_err(render_error)?;

    Ok(())
}

fn render_error<E: std::fmt::Display>(e: E) -> AutoStatError {
    AutoStatError::ReportGenerationFailed(format!("histogram: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_bins() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let histogram = Histogram::from_values("x", &values, 10).unwrap();

        assert_eq!(histogram.edges.len(), 11);
        assert_eq!(histogram.edges[0], 0.0);
        assert_eq!(histogram.edges[10], 10.0);
        // the maximum falls in the last bin
        assert_eq!(histogram.counts[9], 2);
        assert_eq!(histogram.total(), 11);
    }

    #[test]
    fn test_constant_values_widen_range() {
        let histogram = Histogram::from_values("x", &[4.0, 4.0, 4.0], 10).unwrap();

        assert_eq!(histogram.edges[0], 3.5);
        assert_eq!(histogram.edges[10], 4.5);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.counts.iter().filter(|c| **c == 3).count(), 1);
    }

    #[test]
    fn test_no_values() {
        assert!(Histogram::from_values("x", &[], 10).is_none());
        assert!(Histogram::from_values("x", &[f64::NAN], 10).is_none());
    }

    #[test]
    fn test_for_table_skips_text_columns() {
        let df = df![
            "age" => [Some(25i64), Some(30), None],
            "city" => ["A", "B", "A"],
        ]
        .unwrap();

        let histograms = Histogram::for_table(&df, 10).unwrap();
        assert_eq!(histograms.len(), 1);
        assert_eq!(histograms[0].column, "age");
        assert_eq!(histograms[0].total(), 2);
    }

    #[test]
    fn test_render_svg() {
        let a = Histogram::from_values("age", &[25.0, 30.0, 28.0], 10).unwrap();
        let b = Histogram::from_values("income", &[1.0, 2.0], 10).unwrap();

        let svg = render_svg(&[a, b]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("income"));
    }

    #[test]
    fn test_render_svg_requires_histograms() {
        assert!(render_svg(&[]).is_err());
    }
}
