//! Plot rendering with plotters.
//!
//! Each renderer writes one PNG and returns [`EdaError::PlotRender`] on any
//! backend failure; the pipeline logs the error and drops the image from the
//! section rather than aborting the report.

use crate::error::{EdaError, Result};
use crate::stats::{self, CorrelationMatrix, MissingSummary};
use plotters::prelude::*;
use std::path::Path;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn plot_error(what: &str, e: impl std::fmt::Display) -> EdaError {
    EdaError::PlotRender(format!("{}: {}", what, e))
}

/// Bar chart of null percentage per column with missing values.
pub fn missing_values_bar(
    summary: &[MissingSummary],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    if summary.is_empty() {
        return Err(EdaError::PlotRender(
            "no columns with missing values".to_string(),
        ));
    }
    draw_missing_values(summary, path, width, height)
        .map_err(|e| plot_error("missing values chart", e))
}

fn draw_missing_values(
    summary: &[MissingSummary],
    path: &Path,
    width: u32,
    height: u32,
) -> DrawResult {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_pct = summary
        .iter()
        .map(|s| s.null_percentage)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Missing Values (%)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..summary.len() as i32, 0f64..max_pct * 1.1)?;
    chart
        .configure_mesh()
        .x_desc("Column")
        .y_desc("Missing (%)")
        .x_label_formatter(&|idx| {
            summary
                .get(*idx as usize)
                .map(|s| s.column.clone())
                .unwrap_or_default()
        })
        .draw()?;

    for (idx, item) in summary.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (idx as i32, 0.0),
                (idx as i32 + 1, item.null_percentage),
            ],
            BLUE.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

/// One vertical box plot per numeric column, all in a single image.
pub fn outlier_boxplots(
    columns: &[(String, Vec<f64>)],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    if columns.iter().all(|(_, values)| values.is_empty()) {
        return Err(EdaError::PlotRender(
            "no non-null numeric values to plot".to_string(),
        ));
    }
    draw_outlier_boxplots(columns, path, width, height)
        .map_err(|e| plot_error("outlier box plots", e))
}

fn draw_outlier_boxplots(
    columns: &[(String, Vec<f64>)],
    path: &Path,
    width: u32,
    height: u32,
) -> DrawResult {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, values) in columns {
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    let pad = ((max - min) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Outlier Analysis", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        // plotters' Quartiles yields f32, so the y axis must be f32 too.
        .build_cartesian_2d(
            (0i32..columns.len() as i32).into_segmented(),
            ((min - pad) as f32)..((max + pad) as f32),
        )?;
    chart
        .configure_mesh()
        .x_desc("Column")
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => columns
                .get(*idx as usize)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    for (idx, (_, values)) in columns.iter().enumerate() {
        if values.is_empty() {
            continue;
        }
        let quartiles = Quartiles::new(values);
        chart.draw_series(std::iter::once(Boxplot::new_vertical(
            SegmentValue::CenterOf(idx as i32),
            &quartiles,
        )))?;
    }

    root.present()?;
    Ok(())
}

/// Histogram of one numeric column.
pub fn histogram(
    column: &str,
    values: &[f64],
    bins: usize,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let Some((edges, counts)) = stats::histogram(values, bins) else {
        return Err(EdaError::PlotRender(format!(
            "column '{}' has no non-null values to bin",
            column
        )));
    };
    draw_histogram(column, &edges, &counts, path, width, height)
        .map_err(|e| plot_error("histogram", e))
}

fn draw_histogram(
    column: &str,
    edges: &[f64],
    counts: &[usize],
    path: &Path,
    width: u32,
    height: u32,
) -> DrawResult {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_min = edges[0];
    let x_max = edges[edges.len() - 1];
    let y_max = counts.iter().copied().max().unwrap_or(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {}", column), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max.max(x_min + 1.0), 0f64..y_max * 1.1)?;
    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Count")
        .draw()?;

    for (idx, &count) in counts.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(edges[idx], 0.0), (edges[idx + 1], count as f64)],
            BLUE.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

/// Scatter plot of two numeric columns over pairwise complete observations.
pub fn scatter(
    x_name: &str,
    y_name: &str,
    xs: &[Option<f64>],
    ys: &[Option<f64>],
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.is_empty() {
        return Err(EdaError::PlotRender(format!(
            "no complete observations for '{}' vs '{}'",
            x_name, y_name
        )));
    }
    draw_scatter(x_name, y_name, &pairs, path, width, height)
        .map_err(|e| plot_error("scatter plot", e))
}

fn draw_scatter(
    x_name: &str,
    y_name: &str,
    pairs: &[(f64, f64)],
    path: &Path,
    width: u32,
    height: u32,
) -> DrawResult {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in pairs {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(1.0);
    let y_pad = ((y_max - y_min) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs {}", x_name, y_name),
            ("sans-serif", 20),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            (x_min - x_pad)..(x_max + x_pad),
            (y_min - y_pad)..(y_max + y_pad),
        )?;
    chart
        .configure_mesh()
        .x_desc(x_name)
        .y_desc(y_name)
        .draw()?;

    chart.draw_series(
        pairs
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Correlation heatmap over the numeric columns.
pub fn correlation_heatmap(
    matrix: &CorrelationMatrix,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    if matrix.columns.len() < 2 {
        return Err(EdaError::PlotRender(
            "correlation heatmap needs at least two numeric columns".to_string(),
        ));
    }
    draw_correlation_heatmap(matrix, path, width, height)
        .map_err(|e| plot_error("correlation heatmap", e))
}

/// Map r in [-1, 1] to blue (negative) through white (zero) to red
/// (positive). NaN cells render grey.
fn correlation_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(180, 180, 180);
    }
    let t = r.clamp(-1.0, 1.0);
    if t >= 0.0 {
        let fade = (255.0 * (1.0 - t)) as u8;
        RGBColor(255, fade, fade)
    } else {
        let fade = (255.0 * (1.0 + t)) as u8;
        RGBColor(fade, fade, 255)
    }
}

fn draw_correlation_heatmap(
    matrix: &CorrelationMatrix,
    path: &Path,
    width: u32,
    height: u32,
) -> DrawResult {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = matrix.columns.len() as i32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Matrix", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..n, 0i32..n)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|idx| {
            matrix
                .columns
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_label_formatter(&|idx| {
            matrix
                .columns
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()?;

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(j as i32, i as i32), (j as i32 + 1, i as i32 + 1)],
                correlation_color(r).filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_color_endpoints() {
        assert_eq!(correlation_color(1.0), RGBColor(255, 0, 0));
        assert_eq!(correlation_color(-1.0), RGBColor(0, 0, 255));
        assert_eq!(correlation_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(correlation_color(f64::NAN), RGBColor(180, 180, 180));
    }

    #[test]
    fn test_missing_values_bar_rejects_empty_summary() {
        let err = missing_values_bar(&[], Path::new("/tmp/none.png"), 600, 400).unwrap_err();
        assert!(matches!(err, EdaError::PlotRender(_)));
    }

    #[test]
    fn test_scatter_rejects_no_complete_pairs() {
        let xs = vec![Some(1.0), None];
        let ys = vec![None, Some(2.0)];
        let err = scatter("x", "y", &xs, &ys, Path::new("/tmp/none.png"), 600, 400).unwrap_err();
        assert!(matches!(err, EdaError::PlotRender(_)));
    }

    #[test]
    fn test_heatmap_rejects_single_column() {
        let matrix = CorrelationMatrix {
            columns: vec!["x".to_string()],
            values: vec![vec![1.0]],
        };
        let err =
            correlation_heatmap(&matrix, Path::new("/tmp/none.png"), 600, 400).unwrap_err();
        assert!(matches!(err, EdaError::PlotRender(_)));
    }

    #[test]
    fn test_render_smoke() {
        // Render into a temp dir; a headless environment can still rasterize
        // with the bitmap backend.
        let dir = std::env::temp_dir().join("eda_explorer_plot_tests");
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("hist.png");
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 10.0];
        if histogram("value", &values, 5, &path, 320, 240).is_ok() {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_boxplot_render_smoke() {
        let dir = std::env::temp_dir().join("eda_explorer_plot_tests");
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("box.png");
        let columns = vec![
            ("age".to_string(), vec![25.0, 30.0, 30.0, 200.0]),
            ("income".to_string(), vec![30000.0, 45000.0, 52000.0]),
        ];
        if outlier_boxplots(&columns, &path, 320, 240).is_ok() {
            assert!(path.exists());
        }
    }
}
