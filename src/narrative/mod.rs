//! Narrative text generation for report sections.
//!
//! The [`NarrativeProvider`] trait abstracts the text-generation backend so
//! the report pipeline can run against a hosted model or fully offline. Each
//! section of the report makes one synchronous `generate` call; a failed call
//! degrades that section to placeholder text instead of failing the report.

mod local;
pub use local::LocalNarrative;

#[cfg(feature = "ai")]
mod gemini;
#[cfg(feature = "ai")]
pub use gemini::{GeminiConfig, GeminiConfigBuilder, GeminiProvider};

use anyhow::Result;

/// Marker the report pipeline puts in front of the data context of a prompt.
/// Offline providers use it to echo the context back as the narrative.
pub const CONTEXT_MARKER: &str = "CONTEXT:";

/// A text-generation backend for report narratives.
///
/// Implementations must be `Send + Sync`; the pipeline holds the provider
/// behind an `Arc<dyn NarrativeProvider>`.
pub trait NarrativeProvider: Send + Sync {
    /// Generate narrative text for one report section.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unreachable or returns no usable
    /// content. The caller degrades the section, it never aborts the report.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// The model in use, when the provider exposes one.
    fn model(&self) -> Option<&str> {
        None
    }
}
