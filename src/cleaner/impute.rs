//! Missing-value imputation.
//!
//! Numeric columns are filled with the median of the non-null values,
//! categorical and boolean columns with the mode (ties break to the lowest
//! value in the column's natural ordering), and temporal columns with a
//! forward then backward fill. Entirely-null columns are left unchanged and
//! reported as a warning.

use super::CleaningSummary;
use crate::dataset::{ColumnType, Dataset};
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

pub struct Imputer;

impl Imputer {
    pub fn impute(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        let mut summary = CleaningSummary::new("impute_missing", dataset);
        let mut cleaned = dataset.clone();

        for meta in dataset.columns().to_vec() {
            let series = cleaned.series(&meta.name)?.clone();
            let null_count = series.null_count();
            if null_count == 0 {
                continue;
            }
            if null_count == series.len() {
                summary.add_warning(format!(
                    "column '{}' is entirely null, left unchanged",
                    meta.name
                ));
                continue;
            }

            match meta.column_type {
                ColumnType::Numeric => {
                    // median() ignores nulls
                    let Some(median) = series.median() else {
                        summary.add_warning(format!(
                            "column '{}' has no usable median, left unchanged",
                            meta.name
                        ));
                        continue;
                    };
                    let filled = fill_numeric_nulls(&series, median)?;
                    cleaned.replace_series(&meta.name, filled)?;
                    summary.add_message(format!(
                        "filled {} nulls in '{}' with median {:.2}",
                        null_count, meta.name, median
                    ));
                }
                ColumnType::Boolean => {
                    let mode = boolean_mode(&series)?;
                    let filled = fill_boolean_nulls(&series, mode)?;
                    cleaned.replace_series(&meta.name, filled)?;
                    summary.add_message(format!(
                        "filled {} nulls in '{}' with mode {}",
                        null_count, meta.name, mode
                    ));
                }
                ColumnType::Categorical => {
                    let Some(mode) = string_mode(&series) else {
                        summary.add_warning(format!(
                            "column '{}' has no usable mode, left unchanged",
                            meta.name
                        ));
                        continue;
                    };
                    let filled = fill_string_nulls(&series, &mode)?;
                    cleaned.replace_series(&meta.name, filled)?;
                    summary.add_message(format!(
                        "filled {} nulls in '{}' with mode '{}'",
                        null_count, meta.name, mode
                    ));
                }
                ColumnType::Temporal => {
                    let filled = series.fill_null(FillNullStrategy::Forward(None))?;
                    let filled = filled.fill_null(FillNullStrategy::Backward(None))?;
                    cleaned.replace_series(&meta.name, filled)?;
                    summary.add_message(format!(
                        "filled {} nulls in '{}' by forward/backward fill",
                        null_count, meta.name
                    ));
                }
            }
            summary.cells_changed += null_count;
        }

        if summary.messages.is_empty() && summary.warnings.is_empty() {
            summary.add_message("no missing values found");
        }

        info!("{}", summary.digest());
        Ok((cleaned, summary))
    }
}

/// Fill null cells of a numeric column with a fixed value.
///
/// Integer columns keep their dtype when the fill value is integral;
/// otherwise the column is widened to Float64 to hold it.
fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    if is_integer_dtype(series.dtype()) && fill_value.fract() == 0.0 {
        let cast = series.cast(&DataType::Int64)?;
        let values: Vec<Option<i64>> = cast
            .i64()?
            .into_iter()
            .map(|v| Some(v.unwrap_or(fill_value as i64)))
            .collect();
        return Ok(Series::new(series.name().clone(), values));
    }

    let cast = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = cast
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Most frequent boolean value; a tie resolves to `false` (the lowest value
/// in the natural ordering).
fn boolean_mode(series: &Series) -> Result<bool> {
    let chunked = series.bool()?;
    let mut trues = 0usize;
    let mut falses = 0usize;
    for value in chunked.into_iter().flatten() {
        if value {
            trues += 1;
        } else {
            falses += 1;
        }
    }
    Ok(trues > falses)
}

fn fill_boolean_nulls(series: &Series, fill_value: bool) -> Result<Series> {
    let chunked = series.bool()?;
    let values: Vec<Option<bool>> = chunked
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Most frequent string value; ties resolve to the lexicographically lowest
/// value. Returns `None` for all-null or non-castable columns.
fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }
    let cast = non_null.cast(&DataType::String).ok()?;
    let chunked = cast.str().ok()?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in chunked.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending key order, so a strict comparison keeps
    // the lowest value among equally frequent candidates.
    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

fn fill_string_nulls(series: &Series, fill_value: &str) -> Result<Series> {
    let cast = series.cast(&DataType::String)?;
    let chunked = cast.str()?;
    let values: Vec<Option<String>> = chunked
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}
