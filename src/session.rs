//! Session-scoped dataset state.
//!
//! Holds the immutable ingestion snapshot and the mutable working dataset.
//! Every operation reads its starting state from here, so re-running the
//! whole workflow from the top is always safe.

use crate::dataset::Dataset;
use crate::error::{EdaError, Result};
use polars::prelude::DataFrame;
use tracing::info;

/// Owner of the original and working copies of the dataset for one session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    original: Dataset,
    working: Dataset,
}

impl SessionStore {
    /// Ingest a parsed table, storing an immutable original and a working copy.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::Ingestion`] when the table has zero rows or columns.
    pub fn ingest(frame: DataFrame) -> Result<Self> {
        let original = Dataset::from_frame(frame)?;
        info!(
            rows = original.height(),
            columns = original.width(),
            "dataset ingested"
        );
        let working = original.clone();
        Ok(Self { original, working })
    }

    /// Ingest an already constructed dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let working = dataset.clone();
        Self {
            original: dataset,
            working,
        }
    }

    /// The immutable snapshot taken at ingestion.
    pub fn original(&self) -> &Dataset {
        &self.original
    }

    /// The current working dataset.
    pub fn working(&self) -> &Dataset {
        &self.working
    }

    /// Replace the working dataset wholesale after a cleaning operation.
    pub fn replace_working(&mut self, dataset: Dataset) {
        self.working = dataset;
    }

    /// Discard all cleaning and restore the working dataset to the original.
    pub fn reset_to_original(&mut self) -> &Dataset {
        self.working = self.original.clone();
        info!("working dataset reset to original snapshot");
        &self.working
    }

    /// Resolve an optional session, surfacing the missing-state guidance
    /// when a stage runs before any dataset was ingested.
    pub fn require(session: Option<&SessionStore>) -> Result<&SessionStore> {
        session.ok_or(EdaError::MissingState)
    }
}
