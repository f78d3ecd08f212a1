//! Report configuration.

use crate::error::{EdaError, Result};
use std::path::PathBuf;

const DEFAULT_TITLE: &str = "Exploratory Data Analysis Report";
const DEFAULT_OUTPUT_DIR: &str = "./outputs";
const DEFAULT_PLOT_WIDTH: u32 = 600;
const DEFAULT_PLOT_HEIGHT: u32 = 400;
const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Validated options for the report pipeline and the PDF assembler.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Title on the PDF's first page.
    pub title: String,
    /// Directory receiving the PDF.
    pub output_dir: PathBuf,
    /// Directory receiving rendered plot PNGs.
    pub plot_dir: PathBuf,
    /// Plot raster size in pixels.
    pub plot_width: u32,
    pub plot_height: u32,
    /// Bins for univariate histograms.
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            plot_dir: PathBuf::from(DEFAULT_OUTPUT_DIR).join("plots"),
            plot_width: DEFAULT_PLOT_WIDTH,
            plot_height: DEFAULT_PLOT_HEIGHT,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl ReportOptions {
    /// Create a new options builder.
    pub fn builder() -> ReportOptionsBuilder {
        ReportOptionsBuilder::default()
    }

    /// Options rooted at `output_dir`, plots in a `plots/` subdirectory.
    pub fn rooted_at(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            plot_dir: output_dir.join("plots"),
            output_dir,
            ..Self::default()
        }
    }
}

/// Builder for [`ReportOptions`].
#[derive(Default)]
pub struct ReportOptionsBuilder {
    title: Option<String>,
    output_dir: Option<PathBuf>,
    plot_dir: Option<PathBuf>,
    plot_width: Option<u32>,
    plot_height: Option<u32>,
    histogram_bins: Option<usize>,
}

impl ReportOptionsBuilder {
    /// Set the report title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the output directory for the PDF.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the directory for rendered plots.
    pub fn plot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plot_dir = Some(dir.into());
        self
    }

    /// Set the plot raster size in pixels.
    pub fn plot_size(mut self, width: u32, height: u32) -> Self {
        self.plot_width = Some(width);
        self.plot_height = Some(height);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build and validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::InvalidConfig`] on an empty title or zero plot
    /// dimensions or bins.
    pub fn build(self) -> Result<ReportOptions> {
        let defaults = ReportOptions::default();
        let output_dir = self.output_dir.unwrap_or(defaults.output_dir);
        let options = ReportOptions {
            title: self.title.unwrap_or(defaults.title),
            plot_dir: self.plot_dir.unwrap_or_else(|| output_dir.join("plots")),
            output_dir,
            plot_width: self.plot_width.unwrap_or(defaults.plot_width),
            plot_height: self.plot_height.unwrap_or(defaults.plot_height),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
        };

        if options.title.trim().is_empty() {
            return Err(EdaError::InvalidConfig(
                "report title must not be empty".to_string(),
            ));
        }
        if options.plot_width == 0 || options.plot_height == 0 {
            return Err(EdaError::InvalidConfig(
                "plot dimensions must be non-zero".to_string(),
            ));
        }
        if options.histogram_bins == 0 {
            return Err(EdaError::InvalidConfig(
                "histogram bin count must be non-zero".to_string(),
            ));
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let options = ReportOptions::builder().build().unwrap();
        assert_eq!(options.title, DEFAULT_TITLE);
        assert_eq!(options.plot_width, DEFAULT_PLOT_WIDTH);
        assert_eq!(options.plot_height, DEFAULT_PLOT_HEIGHT);
        assert_eq!(options.histogram_bins, DEFAULT_HISTOGRAM_BINS);
    }

    #[test]
    fn test_plot_dir_follows_output_dir() {
        let options = ReportOptions::builder()
            .output_dir("/tmp/reports")
            .build()
            .unwrap();
        assert_eq!(options.plot_dir, PathBuf::from("/tmp/reports/plots"));
    }

    #[test]
    fn test_rejects_empty_title() {
        let err = ReportOptions::builder().title("  ").build().unwrap_err();
        assert!(matches!(err, EdaError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let err = ReportOptions::builder().plot_size(0, 400).build().unwrap_err();
        assert!(matches!(err, EdaError::InvalidConfig(_)));
    }

    #[test]
    fn test_custom_values() {
        let options = ReportOptions::builder()
            .title("Quarterly Data Review")
            .plot_size(800, 500)
            .histogram_bins(30)
            .build()
            .unwrap();
        assert_eq!(options.title, "Quarterly Data Review");
        assert_eq!(options.plot_width, 800);
        assert_eq!(options.histogram_bins, 30);
    }
}
