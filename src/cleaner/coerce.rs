//! Type coercion.
//!
//! Two narrowing moves, both one-way: float columns whose non-null values
//! are all mathematically integral are cast down to Int64, and columns that
//! are neither numeric, boolean nor temporal get their categorical tag made
//! explicit. Row and column counts never change here.

use super::CleaningSummary;
use crate::dataset::{ColumnType, Dataset, is_numeric_dtype, is_temporal_dtype};
use crate::error::Result;
use polars::prelude::*;
use tracing::info;

pub struct TypeCoercer;

impl TypeCoercer {
    pub fn coerce(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        let mut summary = CleaningSummary::new("coerce_types", dataset);
        let mut cleaned = dataset.clone();
        let mut touched = false;

        for meta in dataset.columns().to_vec() {
            let series = cleaned.series(&meta.name)?.clone();
            let dtype = series.dtype().clone();

            if matches!(dtype, DataType::Float32 | DataType::Float64) {
                touched = true;
                if all_values_integral(&series)? {
                    let narrowed = series.cast(&DataType::Int64)?;
                    cleaned.replace_series(&meta.name, narrowed)?;
                    summary.add_message(format!(
                        "narrowed '{}' from {:?} to Int64",
                        meta.name, dtype
                    ));
                }
                continue;
            }

            if !is_numeric_dtype(&dtype)
                && !matches!(dtype, DataType::Boolean)
                && !is_temporal_dtype(&dtype)
            {
                touched = true;
                if cleaned.set_column_type(&meta.name, ColumnType::Categorical)? {
                    summary.add_message(format!("marked '{}' as categorical", meta.name));
                }
            }
        }

        if !touched {
            summary.add_message("no eligible columns");
        } else if summary.messages.is_empty() {
            summary.add_message("all column types already settled");
        }

        info!("{}", summary.digest());
        Ok((cleaned, summary))
    }
}

/// True when every non-null value of a float column has no fractional part
/// and fits in an i64. An all-null column is not considered integral.
fn all_values_integral(series: &Series) -> Result<bool> {
    let cast = series.cast(&DataType::Float64)?;
    let chunked = cast.f64()?;

    let mut seen = false;
    for value in chunked.into_iter().flatten() {
        if value.fract() != 0.0 || !value.is_finite() {
            return Ok(false);
        }
        if value < i64::MIN as f64 || value > i64::MAX as f64 {
            return Ok(false);
        }
        seen = true;
    }
    Ok(seen)
}
