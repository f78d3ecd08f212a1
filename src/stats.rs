//! Shared numeric helpers: quartiles, missing-value summaries, histogram
//! binning and Pearson correlation.

use crate::dataset::Dataset;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;

/// Quartile estimates for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// IQR outlier bounds: [Q1 - 1.5*IQR, Q3 + 1.5*IQR].
    pub fn outlier_bounds(&self) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - 1.5 * iqr, self.q3 + 1.5 * iqr)
    }
}

/// Median of a sorted slice.
fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// Compute quartiles by the median-of-halves method: Q1 is the median of the
/// lower half and Q3 the median of the upper half, with the overall median
/// excluded from both halves when the count is odd.
pub fn quartiles(sorted: &[f64]) -> Option<Quartiles> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(Quartiles {
            q1: sorted[0],
            median: sorted[0],
            q3: sorted[0],
        });
    }

    let median = median_of_sorted(sorted);
    let lower = &sorted[..n / 2];
    let upper = &sorted[n.div_ceil(2)..];

    Some(Quartiles {
        q1: median_of_sorted(lower),
        median,
        q3: median_of_sorted(upper),
    })
}

/// All values of a column as `Option<f64>`, row aligned.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// The non-null values of a column, sorted ascending.
pub fn sorted_non_null(series: &Series) -> Result<Vec<f64>> {
    let mut values: Vec<f64> = numeric_values(series)?.into_iter().flatten().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(values)
}

/// Null count and percentage for one column.
#[derive(Debug, Clone, Serialize)]
pub struct MissingSummary {
    pub column: String,
    pub null_count: usize,
    pub null_percentage: f64,
}

/// Per-column missing-value summary; columns with zero nulls are excluded.
pub fn missing_summary(dataset: &Dataset) -> Vec<MissingSummary> {
    let height = dataset.height().max(1);
    dataset
        .frame()
        .get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| MissingSummary {
            column: col.name().to_string(),
            null_count: col.null_count(),
            null_percentage: (col.null_count() as f64 / height as f64) * 100.0,
        })
        .collect()
}

/// Equal-width histogram bins: returns the bin edges (len = bins + 1) and
/// the count per bin.
pub fn histogram(values: &[f64], bins: usize) -> Option<(Vec<f64>, Vec<usize>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // A constant column still gets one visible bar.
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }
    Some((edges, counts))
}

/// Pearson correlation over pairwise complete observations.
///
/// Returns `None` when fewer than two complete pairs exist or either side
/// has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pairwise Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major values; `values[i][j]` correlates `columns[i]` with
    /// `columns[j]`. Pairs without a defined correlation hold NaN.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Render the matrix as plain text for prompts and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{:>12}", ""));
        for name in &self.columns {
            out.push_str(&format!("{:>12}", truncate(name, 11)));
        }
        out.push('\n');
        for (i, name) in self.columns.iter().enumerate() {
            out.push_str(&format!("{:>12}", truncate(name, 11)));
            for value in &self.values[i] {
                if value.is_nan() {
                    out.push_str(&format!("{:>12}", "-"));
                } else {
                    out.push_str(&format!("{:>12.2}", value));
                }
            }
            out.push('\n');
        }
        out
    }
}

// Truncates on char boundaries; byte slicing panics on multibyte names.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 2).collect();
        format!("{}..", head)
    }
}

/// Compute the correlation matrix over all numeric columns of the dataset.
pub fn correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix> {
    let columns = dataset.numeric_column_names();
    let mut series_values = Vec::with_capacity(columns.len());
    for name in &columns {
        series_values.push(numeric_values(dataset.series(name)?)?);
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&series_values[i], &series_values[j]).unwrap_or(f64::NAN);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix { columns, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quartiles_median_of_halves() {
        // Lower half [25, 30] -> 27.5; upper half [30, 200] -> 115.
        let q = quartiles(&[25.0, 30.0, 30.0, 200.0]).unwrap();
        assert_eq!(q.q1, 27.5);
        assert_eq!(q.q3, 115.0);
        assert_eq!(q.iqr(), 87.5);

        let (lo, hi) = q.outlier_bounds();
        assert_eq!(lo, -103.75);
        assert_eq!(hi, 246.25);
    }

    #[test]
    fn test_quartiles_odd_count_excludes_median() {
        // Halves are [1, 2] and [4, 5]; the median 3 belongs to neither.
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(q.median, 3.0);
        assert_eq!(q.q1, 1.5);
        assert_eq!(q.q3, 4.5);
    }

    #[test]
    fn test_quartiles_degenerate() {
        assert!(quartiles(&[]).is_none());

        let q = quartiles(&[42.0]).unwrap();
        assert_eq!(q.q1, 42.0);
        assert_eq!(q.q3, 42.0);
    }

    #[test]
    fn test_missing_summary_excludes_complete_columns() {
        let df = df![
            "a" => [Some(1i64), None, Some(3), None],
            "b" => [1i64, 2, 3, 4],
            "c" => [Some("x"), Some("y"), None, Some("z")],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let summary = missing_summary(&ds);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].column, "a");
        assert_eq!(summary[0].null_count, 2);
        assert_eq!(summary[0].null_percentage, 50.0);
        assert_eq!(summary[1].column, "c");
        assert_eq!(summary[1].null_count, 1);
    }

    #[test]
    fn test_histogram_counts() {
        let values = [1.0, 1.5, 2.0, 9.0, 10.0];
        let (edges, counts) = histogram(&values, 3).unwrap();
        assert_eq!(edges.len(), 4);
        assert_eq!(counts.iter().sum::<usize>(), 5);
        // Max lands in the last bin.
        assert!(counts[2] >= 1);
    }

    #[test]
    fn test_histogram_constant_column() {
        let (_, counts) = histogram(&[5.0, 5.0, 5.0], 4).unwrap();
        assert_eq!(counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = vec![Some(1.0), Some(2.0), Some(3.0)];
        let ys = vec![Some(2.0), Some(4.0), Some(6.0)];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let neg = vec![Some(6.0), Some(4.0), Some(2.0)];
        let r = pearson(&xs, &neg).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_skips_incomplete_pairs() {
        let xs = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let ys = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        // Only (1,1) and (4,4) remain, which are perfectly correlated.
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let xs = vec![Some(2.0), Some(2.0), Some(2.0)];
        let ys = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson(&xs, &ys).is_none());
    }

    #[test]
    fn test_correlation_matrix_shape() {
        let df = df![
            "x" => [1.0f64, 2.0, 3.0, 4.0],
            "y" => [2.0f64, 4.0, 6.0, 8.0],
            "label" => ["a", "b", "c", "d"],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let matrix = correlation_matrix(&ds).unwrap();
        assert_eq!(matrix.columns, vec!["x", "y"]);
        assert_eq!(matrix.values[0][0], 1.0);
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
        assert!(matrix.to_text().contains("1.00"));
    }

    #[test]
    fn test_matrix_text_truncates_multibyte_names() {
        let df = df![
            "température_moyenne" => [1.0f64, 2.0, 3.0],
            "größenordnung_max" => [2.0f64, 4.0, 6.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let text = correlation_matrix(&ds).unwrap().to_text();
        assert!(text.contains("températu.."));
        assert!(text.contains("größenord.."));
    }

    #[test]
    fn test_truncate_char_boundaries() {
        assert_eq!(truncate("short", 11), "short");
        assert_eq!(truncate("aaaaaaaaéxyz", 11), "aaaaaaaaé..");
        assert_eq!(truncate("exactly_11c", 11), "exactly_11c");
    }
}
