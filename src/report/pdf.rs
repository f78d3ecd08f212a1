//! PDF assembly with genpdf.

use super::ReportSection;
use crate::config::ReportOptions;
use crate::error::{EdaError, Result};
use chrono::Local;
use genpdf::elements::{Break, Image, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator, fonts};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct ReportAssembler {
    options: ReportOptions,
}

impl ReportAssembler {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Assemble the sections into a timestamped PDF in the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::Assembly`] when no usable font family is found or
    /// the document cannot be rendered. Missing or unloadable section images
    /// are skipped with a warning, never an abort.
    pub fn assemble(&self, sections: &[ReportSection]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.options.output_dir)?;

        let font_family = load_fonts()?;
        let mut doc = Document::new(font_family);
        doc.set_title(&self.options.title);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(30);
        doc.set_page_decorator(decorator);

        // Title page block.
        let title_style = Style::new().bold().with_font_size(20);
        doc.push(Paragraph::new(StyledString::new(
            self.options.title.clone(),
            title_style,
        )));
        doc.push(Break::new(1));
        doc.push(Paragraph::new(format!(
            "Generated on: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )));
        doc.push(Break::new(2));

        let heading_style = Style::new().bold().with_font_size(14);
        for section in sections {
            doc.push(Paragraph::new(StyledString::new(
                section.title.clone(),
                heading_style,
            )));
            doc.push(Break::new(0.5));

            for line in section.narrative.lines() {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    doc.push(Paragraph::new(trimmed));
                }
            }
            doc.push(Break::new(0.5));

            if let Some(path) = &section.image {
                match Image::from_path(path) {
                    Ok(image) => {
                        doc.push(image);
                        doc.push(Break::new(0.5));
                    }
                    Err(e) => {
                        warn!(
                            "image '{}' skipped in section '{}': {}",
                            path.display(),
                            section.title,
                            e
                        );
                    }
                }
            }
            doc.push(Break::new(1));
        }

        let file_name = format!("eda_report_{}.pdf", Local::now().format("%Y%m%d_%H%M%S"));
        let output_path = self.options.output_dir.join(file_name);
        doc.render_to_file(&output_path)
            .map_err(|e| EdaError::Assembly(format!("failed to render PDF: {}", e)))?;

        info!("report written to {}", output_path.display());
        Ok(output_path)
    }
}

/// Resolve a font family from the usual system locations.
fn load_fonts() -> Result<fonts::FontFamily<fonts::FontData>> {
    let candidates: [(&str, &str); 4] = [
        ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
        ("/usr/share/fonts/liberation-sans", "LiberationSans"),
        ("/usr/share/fonts/truetype/dejavu", "DejaVuSans"),
        ("/System/Library/Fonts", "Helvetica"),
    ];

    for (dir, family) in candidates {
        if let Ok(fonts) = fonts::from_files(dir, family, None) {
            return Ok(fonts);
        }
    }
    Err(EdaError::Assembly(
        "no usable font family found in the system font directories".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(tag: &str) -> ReportOptions {
        let dir = std::env::temp_dir().join(format!("eda_explorer_pdf_{}", tag));
        ReportOptions::builder().output_dir(&dir).build().unwrap()
    }

    // Font availability is platform-dependent, so the assembly tests accept
    // either a rendered file or an Assembly error.

    #[test]
    fn test_assemble_writes_pdf_when_fonts_exist() {
        let sections = vec![
            ReportSection::new("Dataset Overview", "4 rows, 2 columns."),
            ReportSection::new("Key Insights & Hypotheses", "Nothing remarkable."),
        ];
        let assembler = ReportAssembler::new(options("basic"));

        match assembler.assemble(&sections) {
            Ok(path) => {
                assert!(path.exists());
                assert!(path.extension().is_some_and(|e| e == "pdf"));
            }
            Err(e) => assert!(matches!(e, EdaError::Assembly(_))),
        }
    }

    #[test]
    fn test_missing_image_is_skipped_not_fatal() {
        let sections = vec![
            ReportSection::new("Outlier Analysis", "See the box plots.")
                .with_image(Some(PathBuf::from("/nonexistent/plot.png"))),
        ];
        let assembler = ReportAssembler::new(options("dangling"));

        match assembler.assemble(&sections) {
            Ok(path) => assert!(path.exists()),
            Err(e) => assert!(matches!(e, EdaError::Assembly(_))),
        }
    }
}
