//! Dataset Exploration & Report Pipeline
//!
//! A Polars-backed library for the classic exploratory-data-analysis loop:
//! ingest a CSV, clean it step by step, poke at it with ad-hoc queries, and
//! assemble an illustrated PDF report with AI-generated narratives.
//!
//! # Overview
//!
//! - **Session state**: an immutable original snapshot plus a mutable
//!   working dataset ([`SessionStore`]).
//! - **Cleaning operations**: median/mode imputation, exact-row
//!   deduplication, one-way type narrowing and IQR outlier filtering, each
//!   returning a new dataset plus a [`CleaningSummary`].
//! - **Ad-hoc queries**: a small, closed expression language interpreted
//!   directly over the dataset ([`QueryExecutor`]) — no host-language
//!   evaluation.
//! - **Report pipeline**: a fixed sequence of analysis sections with
//!   plotters charts and per-section narrative calls that degrade to
//!   placeholders when the text service is unavailable.
//! - **PDF assembly**: genpdf document with a title page, per-section
//!   headings, body text and embedded plots.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_explorer::{
//!     CleaningEngine, Dataset, QueryExecutor, ReportAssembler, ReportOptions,
//!     ReportPipeline, SessionStore,
//! };
//! use eda_explorer::narrative::LocalNarrative;
//! use std::sync::Arc;
//!
//! // Ingest
//! let dataset = Dataset::from_csv_path("data.csv")?;
//! let mut session = SessionStore::from_dataset(dataset);
//!
//! // Clean
//! let (cleaned, summary) = CleaningEngine::impute_missing(session.working())?;
//! println!("{}", summary.digest());
//! session.replace_working(cleaned);
//!
//! // Query
//! let result = QueryExecutor::run("mean(age)", session.working())?;
//! println!("{}", result.render());
//!
//! // Report
//! let options = ReportOptions::rooted_at("./outputs");
//! let pipeline = ReportPipeline::new(Arc::new(LocalNarrative), options.clone());
//! let sections = pipeline.generate(session.working())?;
//! let pdf = ReportAssembler::new(options).assemble(&sections)?;
//! println!("report: {}", pdf.display());
//! ```
//!
//! # Narrative Providers
//!
//! Report narratives go through the [`narrative::NarrativeProvider`] trait.
//! [`narrative::GeminiProvider`] (behind the `ai` feature) calls the Gemini
//! API with a key injected via environment or config; [`narrative::LocalNarrative`]
//! runs fully offline. A provider failure never fails the report: the
//! affected section carries a visible placeholder instead.

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod narrative;
pub mod query;
pub mod report;
pub mod session;
pub mod stats;

pub use cleaner::{CleaningEngine, CleaningSummary};
pub use config::ReportOptions;
pub use dataset::{ColumnMeta, ColumnType, Dataset};
pub use error::{EdaError, Result};
pub use query::{QueryExecutor, QueryResult};
pub use report::{ReportAssembler, ReportPipeline, ReportSection};
pub use session::SessionStore;
