//! Cleaning operations over the working dataset.
//!
//! Each operation takes the working [`Dataset`] and returns a new dataset
//! plus a [`CleaningSummary`] describing what changed. Operations are
//! independent and can run in any order, any number of times; imputation,
//! deduplication and type coercion are idempotent, outlier filtering is not
//! (quartiles are re-estimated on each call's input).

mod coerce;
mod impute;
mod outliers;

pub use coerce::TypeCoercer;
pub use impute::Imputer;
pub use outliers::OutlierFilter;

use crate::dataset::Dataset;
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

/// Human-readable account of one cleaning operation.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub operation: String,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Cells whose value changed (filled nulls for imputation).
    pub cells_changed: usize,
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    pub fn new(operation: impl Into<String>, dataset: &Dataset) -> Self {
        let rows = dataset.height();
        Self {
            operation: operation.into(),
            rows_before: rows,
            rows_after: rows,
            cells_changed: 0,
            messages: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Summary for an operation that found nothing to work on.
    pub fn no_eligible_columns(operation: impl Into<String>, dataset: &Dataset) -> Self {
        let mut summary = Self::new(operation, dataset);
        summary.add_message("no eligible columns");
        summary
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// One-line digest for logs and the CLI run summary.
    pub fn digest(&self) -> String {
        format!(
            "{}: rows {} -> {} ({} removed), {} cells changed",
            self.operation,
            self.rows_before,
            self.rows_after,
            self.rows_removed(),
            self.cells_changed
        )
    }
}

/// Entry point for all cleaning operations.
pub struct CleaningEngine;

impl CleaningEngine {
    /// Fill missing values: median for numeric columns, mode for
    /// categorical/boolean columns (ties break to the lowest value),
    /// forward/backward fill for temporal columns.
    pub fn impute_missing(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        Imputer::impute(dataset)
    }

    /// Remove rows that exactly duplicate an earlier row, keeping the first
    /// occurrence and preserving survivor order.
    pub fn deduplicate(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        let mut summary = CleaningSummary::new("deduplicate", dataset);

        let unique = dataset
            .frame()
            .unique_stable(None, UniqueKeepStrategy::First, None)?;
        let cleaned = dataset.with_frame(unique);
        summary.rows_after = cleaned.height();

        if summary.rows_removed() > 0 {
            summary.add_message(format!(
                "removed {} duplicate rows",
                summary.rows_removed()
            ));
        } else {
            summary.add_message("no duplicate rows found");
        }

        info!("{}", summary.digest());
        Ok((cleaned, summary))
    }

    /// Narrow integral float columns to integers and make categorical tags
    /// explicit. One-way: never widens back to floating point.
    pub fn coerce_types(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        TypeCoercer::coerce(dataset)
    }

    /// Remove rows with a value outside the IQR bounds in any numeric
    /// column, using quartiles computed on this call's input.
    pub fn filter_outliers(dataset: &Dataset) -> Result<(Dataset, CleaningSummary)> {
        OutlierFilter::filter(dataset)
    }

    /// Snapshot the working dataset as the explicit new baseline. A no-op
    /// transform that exists to make state explicit after a series of
    /// operations.
    pub fn commit(dataset: &Dataset) -> (Dataset, CleaningSummary) {
        let mut summary = CleaningSummary::new("commit", dataset);
        summary.add_message(format!(
            "snapshot saved ({} rows x {} columns)",
            dataset.height(),
            dataset.width()
        ));
        info!("{}", summary.digest());
        (dataset.clone(), summary)
    }
}
