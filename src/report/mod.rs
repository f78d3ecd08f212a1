//! Report generation: the analysis pipeline and the PDF assembler.

mod pdf;
mod pipeline;
pub mod plots;

pub use pdf::ReportAssembler;
pub use pipeline::ReportPipeline;

use serde::Serialize;
use std::path::PathBuf;

/// One section of the report: a heading, narrative text and an optional
/// rendered plot.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub narrative: String,
    pub image: Option<PathBuf>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, narrative: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            narrative: narrative.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<PathBuf>) -> Self {
        self.image = image;
        self
    }
}
