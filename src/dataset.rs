//! The tabular dataset model.
//!
//! A [`Dataset`] wraps a polars `DataFrame` together with an explicit
//! semantic type tag per column. Tags are assigned once at ingestion from the
//! parsed dtypes and are only ever updated by the type-coercion cleaning
//! operation; everything downstream (imputation, outlier filtering, the query
//! executor, the report pipeline) keys off the tags rather than re-inspecting
//! dtypes.

use crate::error::{EdaError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Integer or floating point numbers.
    Numeric,
    /// Text or other discrete non-numeric values.
    Categorical,
    /// Boolean values.
    Boolean,
    /// Dates, datetimes and times.
    Temporal,
}

impl ColumnType {
    /// Short lowercase label, used in overviews and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
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
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date/time type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Infer the semantic type tag for a column from its parsed dtype.
pub fn infer_column_type(dtype: &DataType) -> ColumnType {
    if is_numeric_dtype(dtype) {
        ColumnType::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        ColumnType::Boolean
    } else if is_temporal_dtype(dtype) {
        ColumnType::Temporal
    } else {
        ColumnType::Categorical
    }
}

/// Per-column metadata carried alongside the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub column_type: ColumnType,
}

/// The in-memory tabular value flowing through the pipeline.
///
/// Invariant: `columns` is aligned with the frame's columns, in order, and
/// every column has the same row count (guaranteed by the `DataFrame`).
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    columns: Vec<ColumnMeta>,
}

impl Dataset {
    /// Build a dataset from a parsed frame, inferring type tags.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::Ingestion`] when the frame has zero rows or zero
    /// columns.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        if frame.width() == 0 {
            return Err(EdaError::Ingestion("table has no columns".to_string()));
        }
        if frame.height() == 0 {
            return Err(EdaError::Ingestion("table has no rows".to_string()));
        }

        let columns = frame
            .get_columns()
            .iter()
            .map(|col| ColumnMeta {
                name: col.name().to_string(),
                column_type: infer_column_type(col.dtype()),
            })
            .collect();

        Ok(Self { frame, columns })
    }

    /// Load a dataset from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))
            .map_err(|e| EdaError::Ingestion(e.to_string()))?
            .finish()
            .map_err(|e| EdaError::Ingestion(e.to_string()))?;

        Self::from_frame(frame)
    }

    /// Load a dataset from in-memory CSV bytes.
    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| EdaError::Ingestion(e.to_string()))?;

        Self::from_frame(frame)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Names of all columns, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Type tag of a column, if it exists.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }

    /// Names of all columns tagged numeric, in order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }

    /// The materialized series for a column.
    pub fn series(&self, name: &str) -> Result<&Series> {
        let col = self
            .frame
            .column(name)
            .map_err(|_| EdaError::ColumnNotFound(name.to_string()))?;
        Ok(col.as_materialized_series())
    }

    /// Replace a single column's series, keeping its tag.
    pub fn replace_series(&mut self, name: &str, series: Series) -> Result<()> {
        self.frame.replace(name, series)?;
        Ok(())
    }

    /// Update the type tag of a column. Returns true if the tag changed.
    pub fn set_column_type(&mut self, name: &str, column_type: ColumnType) -> Result<bool> {
        let meta = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| EdaError::ColumnNotFound(name.to_string()))?;
        let changed = meta.column_type != column_type;
        meta.column_type = column_type;
        Ok(changed)
    }

    /// Rebuild this dataset around a transformed frame with the same columns,
    /// preserving the type tags. Used by row-level operations (dedup, outlier
    /// filtering, query filters) that never touch the schema.
    pub fn with_frame(&self, frame: DataFrame) -> Self {
        debug_assert_eq!(frame.width(), self.frame.width());
        Self {
            frame,
            columns: self.columns.clone(),
        }
    }

    /// Keep only the rows where `mask` is true. The mask must be row-aligned.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        let filtered = self.frame.filter(&mask)?;
        Ok(self.with_frame(filtered))
    }

    /// Project a subset of columns into a new dataset, tags included.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let frame = self
            .frame
            .select(names.iter().copied())
            .map_err(|_| match names.iter().find(|n| self.column_type(n).is_none()) {
                Some(missing) => EdaError::ColumnNotFound(missing.to_string()),
                None => EdaError::Query("invalid column selection".to_string()),
            })?;
        let columns = self
            .columns
            .iter()
            .filter(|c| names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Ok(Self { frame, columns })
    }

    /// One line per column: name, type tag, dtype, null count.
    pub fn overview_lines(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|meta| {
                let nulls = self
                    .frame
                    .column(&meta.name)
                    .map(|c| c.null_count())
                    .unwrap_or(0);
                let dtype = self
                    .frame
                    .column(&meta.name)
                    .map(|c| format!("{:?}", c.dtype()))
                    .unwrap_or_else(|_| "?".to_string());
                format!(
                    "{} [{}] dtype={} nulls={}",
                    meta.name,
                    meta.column_type.label(),
                    dtype,
                    nulls
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_frame_infers_tags() {
        let df = df![
            "age" => [25i64, 30, 35],
            "name" => ["ann", "bob", "cat"],
            "active" => [true, false, true],
            "score" => [1.5f64, 2.5, 3.5],
        ]
        .unwrap();

        let ds = Dataset::from_frame(df).unwrap();
        assert_eq!(ds.column_type("age"), Some(ColumnType::Numeric));
        assert_eq!(ds.column_type("name"), Some(ColumnType::Categorical));
        assert_eq!(ds.column_type("active"), Some(ColumnType::Boolean));
        assert_eq!(ds.column_type("score"), Some(ColumnType::Numeric));
        assert_eq!(ds.shape(), (3, 4));
    }

    #[test]
    fn test_from_frame_rejects_empty() {
        let df = df![
            "age" => Vec::<i64>::new(),
        ]
        .unwrap();

        let err = Dataset::from_frame(df).unwrap_err();
        assert!(matches!(err, EdaError::Ingestion(_)));
    }

    #[test]
    fn test_from_csv_bytes() {
        let csv = b"a,b\n1,x\n2,y\n".to_vec();
        let ds = Dataset::from_csv_bytes(csv).unwrap();
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.column_type("a"), Some(ColumnType::Numeric));
        assert_eq!(ds.column_type("b"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_from_csv_bytes_unparsable() {
        let err = Dataset::from_csv_bytes(b"a,b\n".to_vec()).unwrap_err();
        assert!(matches!(err, EdaError::Ingestion(_)));
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df![
            "x" => [1i64, 2],
            "label" => ["a", "b"],
            "y" => [0.1f64, 0.2],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        assert_eq!(ds.numeric_column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_filter_rows_preserves_tags() {
        let df = df![
            "x" => [1i64, 2, 3],
            "label" => ["a", "b", "c"],
        ]
        .unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let filtered = ds.filter_rows(&[true, false, true]).unwrap();

        assert_eq!(filtered.height(), 2);
        assert_eq!(filtered.column_type("label"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_select_unknown_column() {
        let df = df!["x" => [1i64]].unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let err = ds.select(&["missing"]).unwrap_err();
        assert!(matches!(err, EdaError::ColumnNotFound(_)));
    }

    #[test]
    fn test_set_column_type() {
        let df = df!["code" => ["a1", "b2"]].unwrap();
        let mut ds = Dataset::from_frame(df).unwrap();

        // Already categorical, so re-tagging reports no change.
        assert!(!ds.set_column_type("code", ColumnType::Categorical).unwrap());
        assert!(ds.set_column_type("code", ColumnType::Boolean).unwrap());
        assert_eq!(ds.column_type("code"), Some(ColumnType::Boolean));
    }
}
