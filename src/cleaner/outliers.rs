//! IQR outlier row filtering.
//!
//! Quartiles are computed per numeric column on this call's input dataset;
//! a row survives only if every non-null numeric value lies within
//! [Q1 - 1.5*IQR, Q3 + 1.5*IQR]. Nulls never trigger removal by themselves.
//! Re-running the filter re-estimates quartiles on the shrunk dataset, so
//! the operation is deliberately not idempotent.

use super::CleaningSummary;
use crate::dataset::{Dataset, is_numeric_dtype};
use crate::error::Result;
use crate::stats;
use tracing::info;

pub struct OutlierFilter;

impl OutlierFilter {
    pub fn filter(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        let numeric: Vec<String> = dataset
            .numeric_column_names()
            .into_iter()
            .filter(|name| {
                dataset
                    .series(name)
                    .map(|s| is_numeric_dtype(s.dtype()))
                    .unwrap_or(false)
            })
            .collect();

        if numeric.is_empty() {
            let summary = CleaningSummary::no_eligible_columns("filter_outliers", dataset);
            info!("{}", summary.digest());
            return Ok((dataset.clone(), summary));
        }

        let mut summary = CleaningSummary::new("filter_outliers", dataset);
        let mut mask = vec![true; dataset.height()];

        for name in &numeric {
            let series = dataset.series(name)?;
            let sorted = stats::sorted_non_null(series)?;
            let Some(quartiles) = stats::quartiles(&sorted) else {
                summary.add_warning(format!(
                    "column '{}' is entirely null, skipped",
                    name
                ));
                continue;
            };
            let (lower, upper) = quartiles.outlier_bounds();
            summary.add_message(format!(
                "'{}': Q1={:.2} Q3={:.2} bounds [{:.2}, {:.2}]",
                name, quartiles.q1, quartiles.q3, lower, upper
            ));

            for (row, value) in stats::numeric_values(series)?.into_iter().enumerate() {
                // Null comparisons are false, so nulls stay.
                if let Some(v) = value
                    && (v < lower || v > upper)
                {
                    mask[row] = false;
                }
            }
        }

        let cleaned = dataset.filter_rows(&mask)?;
        summary.rows_after = cleaned.height();
        summary.add_message(format!("removed {} outlier rows", summary.rows_removed()));

        info!("{}", summary.digest());
        Ok((cleaned, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_all_rows_within_bounds() {
        // Q1=27.5, Q3=115, IQR=87.5 -> bounds [-103.75, 246.25];
        // 200 < 246.25, so every row is retained.
        let df = df![
            "age" => [25.0f64, 30.0, 30.0, 200.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, summary) = OutlierFilter::filter(&ds).unwrap();
        assert_eq!(cleaned.height(), 4);
        assert_eq!(summary.rows_removed(), 0);
        assert!(summary.messages[0].contains("27.50"));
        assert!(summary.messages[0].contains("115.00"));
    }

    #[test]
    fn test_extreme_value_removed() {
        let df = df![
            "value" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, summary) = OutlierFilter::filter(&ds).unwrap();
        assert_eq!(summary.rows_removed(), 1);

        let max = cleaned
            .series("value")
            .unwrap()
            .f64()
            .unwrap()
            .max()
            .unwrap();
        assert!(max < 1000.0);
    }

    #[test]
    fn test_row_removed_when_any_column_is_outlying() {
        let df = df![
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            "b" => [10.0f64, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 900.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, _) = OutlierFilter::filter(&ds).unwrap();
        // The last row is fine in "a" but extreme in "b".
        assert_eq!(cleaned.height(), 7);
    }

    #[test]
    fn test_nulls_are_retained() {
        let df = df![
            "value" => [Some(1.0f64), Some(2.0), None, Some(4.0), Some(5.0)],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, _) = OutlierFilter::filter(&ds).unwrap();
        assert_eq!(cleaned.height(), 5);
        assert_eq!(cleaned.series("value").unwrap().null_count(), 1);
    }

    #[test]
    fn test_no_numeric_columns_is_a_reported_no_op() {
        let df = df![
            "label" => ["a", "b", "c"],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, summary) = OutlierFilter::filter(&ds).unwrap();
        assert_eq!(cleaned.height(), 3);
        assert!(summary.messages[0].contains("no eligible columns"));
    }

    #[test]
    fn test_quartiles_come_from_the_input_dataset() {
        // First pass removes only the extreme value; a second pass with
        // re-estimated quartiles may remove more (non-idempotent).
        let df = df![
            "value" => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0, 1000.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (once, first) = OutlierFilter::filter(&ds).unwrap();
        assert!(first.rows_removed() >= 1);

        let (twice, _) = OutlierFilter::filter(&once).unwrap();
        assert!(twice.height() <= once.height());
    }

    #[test]
    fn test_constant_column_keeps_all_rows() {
        let df = df![
            "value" => [5.0f64, 5.0, 5.0, 5.0],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();

        let (cleaned, _) = OutlierFilter::filter(&ds).unwrap();
        assert_eq!(cleaned.height(), 4);
    }
}
