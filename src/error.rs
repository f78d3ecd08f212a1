//! Custom error types for the EDA workflow.
//!
//! This module provides the error hierarchy using `thiserror`. Failures that
//! the pipeline is expected to absorb (narrative calls, plot renders, image
//! loads) still get their own variants so call sites can log them with a
//! stable code before degrading.

use thiserror::Error;

/// The main error type for the EDA workflow.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Input table was empty or could not be parsed.
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    /// A pipeline stage was invoked before a dataset was loaded.
    #[error("No dataset loaded; ingest a CSV file first")]
    MissingState,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An ad-hoc query expression failed to parse or evaluate.
    #[error("Query failed: {0}")]
    Query(String),

    /// The external text-generation call failed.
    #[error("Narrative service error: {0}")]
    NarrativeService(String),

    /// A chart could not be rendered.
    #[error("Failed to render plot: {0}")]
    PlotRender(String),

    /// A previously rendered image could not be reloaded at assembly time.
    #[error("Failed to load image asset: {0}")]
    AssetLoad(String),

    /// Document serialization failed.
    #[error("Failed to assemble report document: {0}")]
    Assembly(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

impl EdaError {
    /// Get a stable code for this error, used in machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ingestion(_) => "INGESTION_ERROR",
            Self::MissingState => "MISSING_STATE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Query(_) => "QUERY_ERROR",
            Self::NarrativeService(_) => "NARRATIVE_SERVICE_ERROR",
            Self::PlotRender(_) => "PLOT_RENDER_ERROR",
            Self::AssetLoad(_) => "ASSET_LOAD_ERROR",
            Self::Assembly(_) => "ASSEMBLY_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
        }
    }

    /// Whether this error only degrades a single section of the report
    /// rather than halting the workflow.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::NarrativeService(_) | Self::PlotRender(_) | Self::AssetLoad(_)
        )
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(EdaError::MissingState.error_code(), "MISSING_STATE");
        assert_eq!(
            EdaError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            EdaError::Query("bad token".to_string()).error_code(),
            "QUERY_ERROR"
        );
    }

    #[test]
    fn test_is_degradable() {
        assert!(EdaError::NarrativeService("timeout".to_string()).is_degradable());
        assert!(EdaError::PlotRender("backend".to_string()).is_degradable());
        assert!(!EdaError::Ingestion("empty".to_string()).is_degradable());
        assert!(!EdaError::MissingState.is_degradable());
    }

    #[test]
    fn test_display_messages() {
        let err = EdaError::Ingestion("zero rows".to_string());
        assert!(err.to_string().contains("zero rows"));

        let err = EdaError::MissingState;
        assert!(err.to_string().contains("ingest a CSV"));
    }
}
