//! Ad-hoc query execution over the working dataset.
//!
//! Queries are a small closed expression language, interpreted directly over
//! the dataset: column references, literals, arithmetic, comparisons, boolean
//! logic, and a fixed set of built-in functions (`mean`, `median`, `min`,
//! `max`, `sum`, `count`, `filter`). There is no escape hatch into the host
//! language; anything outside the grammar is rejected with a
//! [`EdaError::Query`] error before evaluation starts.
//!
//! A boolean row-wise result filters the dataset; a bare column reference
//! projects it. Queries never mutate the dataset they run against.

mod eval;
mod lexer;
mod parser;

use crate::dataset::Dataset;
use crate::error::Result;

/// Outcome of one query.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// Row-wise results: a filtered view or a projected column.
    Table(Dataset),
    Scalar(f64),
    Bool(bool),
    Text(String),
}

impl QueryResult {
    /// Render for the CLI. Tables use the frame's own pretty-printer.
    pub fn render(&self) -> String {
        match self {
            Self::Table(dataset) => format!("{}", dataset.frame()),
            Self::Scalar(value) => format!("{}", value),
            Self::Bool(value) => format!("{}", value),
            Self::Text(value) => value.clone(),
        }
    }
}

pub struct QueryExecutor;

impl QueryExecutor {
    /// Parse and evaluate `expression` against `dataset`.
    pub fn run(expression: &str, dataset: &Dataset) -> Result<QueryResult> {
        let tokens = lexer::tokenize(expression)?;
        let expr = parser::parse(tokens)?;
        eval::evaluate(&expr, dataset)
    }
}
