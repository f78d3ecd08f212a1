//! The analysis and narrative pipeline.
//!
//! Produces the ordered list of [`ReportSection`]s: overview, missing
//! values, outliers, univariate (per numeric column), bivariate (per
//! unordered pair), multivariate correlation and closing insights. Each
//! section makes one synchronous narrative call; a failed call degrades that
//! section to a visible placeholder and a failed plot render drops the image,
//! neither aborts the run.

use super::{ReportSection, plots};
use crate::config::ReportOptions;
use crate::dataset::{Dataset, is_numeric_dtype};
use crate::error::Result;
use crate::narrative::{CONTEXT_MARKER, NarrativeProvider};
use crate::stats;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ReportPipeline {
    provider: Arc<dyn NarrativeProvider>,
    options: ReportOptions,
}

impl ReportPipeline {
    pub fn new(provider: Arc<dyn NarrativeProvider>, options: ReportOptions) -> Self {
        Self { provider, options }
    }

    /// Run the full analysis over `dataset` and return the ordered sections.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (creating the plot directory, reading
    /// the frame) abort; narrative and plot failures degrade per section.
    pub fn generate(&self, dataset: &Dataset) -> Result<Vec<ReportSection>> {
        std::fs::create_dir_all(&self.options.plot_dir)?;
        info!(
            provider = self.provider.name(),
            model = self.provider.model().unwrap_or("-"),
            "generating report sections"
        );

        let numeric = numeric_columns(dataset);
        let mut sections = Vec::new();

        sections.push(self.overview_section(dataset)?);
        sections.push(self.missing_section(dataset)?);
        sections.push(self.outlier_section(dataset, &numeric)?);
        for name in &numeric {
            sections.push(self.univariate_section(dataset, name)?);
        }
        for i in 0..numeric.len() {
            for j in (i + 1)..numeric.len() {
                sections.push(self.bivariate_section(dataset, &numeric[i], &numeric[j])?);
            }
        }
        sections.push(self.multivariate_section(dataset)?);
        sections.push(self.insights_section(dataset, &numeric));

        Ok(sections)
    }

    fn overview_section(&self, dataset: &Dataset) -> Result<ReportSection> {
        let (rows, cols) = dataset.shape();
        let mut context = format!("rows={} columns={}\n", rows, cols);
        for line in dataset.overview_lines() {
            context.push_str(&line);
            context.push('\n');
        }
        let narrative = self.narrate(
            "Describe this dataset's shape and column types in two short paragraphs.",
            &context,
        );
        Ok(ReportSection::new("Dataset Overview", narrative))
    }

    fn missing_section(&self, dataset: &Dataset) -> Result<ReportSection> {
        let summary = stats::missing_summary(dataset);

        if summary.is_empty() {
            let narrative = self.narrate(
                "State briefly that the dataset has no missing values.",
                "no column has null cells",
            );
            // No chart when there is nothing to chart.
            return Ok(ReportSection::new("Missing Value Analysis", narrative));
        }

        let mut context = String::new();
        for item in &summary {
            context.push_str(&format!(
                "{}: {} nulls ({:.1}%)\n",
                item.column, item.null_count, item.null_percentage
            ));
        }
        let narrative = self.narrate(
            "Analyze the missing values per column and suggest how to handle them.",
            &context,
        );
        let image = self.try_plot("missing_values.png", |path| {
            plots::missing_values_bar(
                &summary,
                path,
                self.options.plot_width,
                self.options.plot_height,
            )
        });
        Ok(ReportSection::new("Missing Value Analysis", narrative).with_image(image))
    }

    fn outlier_section(&self, dataset: &Dataset, numeric: &[String]) -> Result<ReportSection> {
        let mut columns = Vec::new();
        let mut context = String::new();
        for name in numeric {
            let values = stats::sorted_non_null(dataset.series(name)?)?;
            if let Some(q) = stats::quartiles(&values) {
                let (lower, upper) = q.outlier_bounds();
                context.push_str(&format!(
                    "{}: Q1={:.2} Q3={:.2} bounds [{:.2}, {:.2}]\n",
                    name, q.q1, q.q3, lower, upper
                ));
            }
            columns.push((name.clone(), values));
        }
        if context.is_empty() {
            context.push_str("no numeric columns");
        }

        let narrative = self.narrate(
            "Discuss potential outliers in the numeric columns using the IQR bounds.",
            &context,
        );
        let image = self.try_plot("outliers.png", |path| {
            plots::outlier_boxplots(
                &columns,
                path,
                self.options.plot_width,
                self.options.plot_height,
            )
        });
        Ok(ReportSection::new("Outlier Analysis", narrative).with_image(image))
    }

    fn univariate_section(&self, dataset: &Dataset, name: &str) -> Result<ReportSection> {
        let values = stats::sorted_non_null(dataset.series(name)?)?;
        let context = match stats::quartiles(&values) {
            Some(q) => format!(
                "{}: n={} min={:.2} q1={:.2} median={:.2} q3={:.2} max={:.2}",
                name,
                values.len(),
                values.first().copied().unwrap_or(f64::NAN),
                q.q1,
                q.median,
                q.q3,
                values.last().copied().unwrap_or(f64::NAN),
            ),
            None => format!("{}: no non-null values", name),
        };

        let narrative = self.narrate(
            "Describe the distribution of this numeric column.",
            &context,
        );
        let image = self.try_plot(&format!("univariate_{}.png", sanitize(name)), |path| {
            plots::histogram(
                name,
                &values,
                self.options.histogram_bins,
                path,
                self.options.plot_width,
                self.options.plot_height,
            )
        });
        Ok(ReportSection::new(format!("Univariate Analysis - {}", name), narrative)
            .with_image(image))
    }

    fn bivariate_section(&self, dataset: &Dataset, a: &str, b: &str) -> Result<ReportSection> {
        let xs = stats::numeric_values(dataset.series(a)?)?;
        let ys = stats::numeric_values(dataset.series(b)?)?;
        let context = match stats::pearson(&xs, &ys) {
            Some(r) => format!("pearson({}, {}) = {:.3}", a, b, r),
            None => format!("correlation of {} and {} is undefined", a, b),
        };

        let narrative = self.narrate(
            "Describe the relationship between these two numeric columns.",
            &context,
        );
        let image = self.try_plot(
            &format!("bivariate_{}_{}.png", sanitize(a), sanitize(b)),
            |path| {
                plots::scatter(
                    a,
                    b,
                    &xs,
                    &ys,
                    path,
                    self.options.plot_width,
                    self.options.plot_height,
                )
            },
        );
        Ok(
            ReportSection::new(format!("Bivariate Analysis - {} vs {}", a, b), narrative)
                .with_image(image),
        )
    }

    fn multivariate_section(&self, dataset: &Dataset) -> Result<ReportSection> {
        let matrix = stats::correlation_matrix(dataset)?;
        let context = if matrix.columns.len() < 2 {
            "fewer than two numeric columns, no correlation matrix".to_string()
        } else {
            matrix.to_text()
        };

        let narrative = self.narrate(
            "Summarize the strongest correlations in this matrix.",
            &context,
        );
        let image = self.try_plot("multivariate.png", |path| {
            plots::correlation_heatmap(
                &matrix,
                path,
                self.options.plot_width,
                self.options.plot_height,
            )
        });
        Ok(ReportSection::new("Multivariate Analysis", narrative).with_image(image))
    }

    fn insights_section(&self, dataset: &Dataset, numeric: &[String]) -> ReportSection {
        let (rows, cols) = dataset.shape();
        let context = format!(
            "rows={} columns={} numeric_columns={}\ncolumns: {}",
            rows,
            cols,
            numeric.len(),
            dataset.column_names().join(", ")
        );
        let narrative = self.narrate(
            "Give three key insights and two hypotheses worth testing on this dataset.",
            &context,
        );
        ReportSection::new("Key Insights & Hypotheses", narrative)
    }

    /// One synchronous provider call; failure degrades to a visible
    /// placeholder, never an error.
    fn narrate(&self, instruction: &str, context: &str) -> String {
        let prompt = format!("{}\n{}\n{}", instruction, CONTEXT_MARKER, context);
        match self.provider.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                warn!(provider = self.provider.name(), "narrative call failed: {}", e);
                format!("[narrative unavailable: {}]", e)
            }
        }
    }

    /// Render one plot; failure drops the image and keeps the section text.
    fn try_plot(
        &self,
        file_name: &str,
        render: impl FnOnce(&Path) -> Result<()>,
    ) -> Option<PathBuf> {
        let path = self.options.plot_dir.join(file_name);
        match render(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("plot '{}' skipped: {}", file_name, e);
                None
            }
        }
    }
}

/// Columns tagged numeric whose backing dtype is actually numeric.
fn numeric_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .numeric_column_names()
        .into_iter()
        .filter(|name| {
            dataset
                .series(name)
                .map(|s| is_numeric_dtype(s.dtype()))
                .unwrap_or(false)
        })
        .collect()
}

/// File-name-safe version of a column name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
