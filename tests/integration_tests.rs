//! End-to-end tests: CSV ingestion, cleaning workflow, ad-hoc queries and
//! report generation against fixture datasets.

use eda_explorer::narrative::{LocalNarrative, NarrativeProvider};
use eda_explorer::{
    CleaningEngine, ColumnType, Dataset, EdaError, QueryExecutor, QueryResult, ReportAssembler,
    ReportOptions, ReportPipeline, SessionStore,
};
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_dataset(filename: &str) -> Dataset {
    Dataset::from_csv_path(fixtures_path().join(filename)).expect("Failed to load fixture CSV")
}

fn temp_options(tag: &str) -> ReportOptions {
    let dir = std::env::temp_dir().join(format!("eda_explorer_integration_{}", tag));
    ReportOptions::builder()
        .output_dir(&dir)
        .plot_size(320, 240)
        .build()
        .unwrap()
}

struct UnreachableService;

impl NarrativeProvider for UnreachableService {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }

    fn name(&self) -> &str {
        "Unreachable"
    }
}

// ============================================================================
// Ingestion and Session State
// ============================================================================

#[test]
fn test_ingest_fixture_infers_type_tags() {
    let ds = load_dataset("people.csv");

    assert_eq!(ds.shape(), (6, 4));
    assert_eq!(ds.column_type("age"), Some(ColumnType::Numeric));
    assert_eq!(ds.column_type("income"), Some(ColumnType::Numeric));
    assert_eq!(ds.column_type("city"), Some(ColumnType::Categorical));
    assert_eq!(ds.column_type("active"), Some(ColumnType::Boolean));
}

#[test]
fn test_ingest_header_only_file_fails() {
    let err = Dataset::from_csv_path(fixtures_path().join("header_only.csv")).unwrap_err();
    assert!(matches!(err, EdaError::Ingestion(_)));
}

#[test]
fn test_session_original_survives_cleaning() {
    let mut session = SessionStore::from_dataset(load_dataset("people.csv"));

    let (deduped, _) = CleaningEngine::deduplicate(session.working()).unwrap();
    session.replace_working(deduped);
    assert_eq!(session.working().height(), 5);
    assert_eq!(session.original().height(), 6);

    session.reset_to_original();
    assert_eq!(session.working().height(), 6);
}

// ============================================================================
// Cleaning Workflow
// ============================================================================

#[test]
fn test_full_cleaning_workflow() {
    let mut session = SessionStore::from_dataset(load_dataset("people.csv"));

    let (imputed, summary) = CleaningEngine::impute_missing(session.working()).unwrap();
    assert_eq!(summary.cells_changed, 1);
    session.replace_working(imputed);
    let total_nulls: usize = session
        .working()
        .frame()
        .get_columns()
        .iter()
        .map(|c| c.null_count())
        .sum();
    assert_eq!(total_nulls, 0);

    let (deduped, summary) = CleaningEngine::deduplicate(session.working()).unwrap();
    assert_eq!(summary.rows_removed(), 1);
    session.replace_working(deduped);

    let (coerced, _) = CleaningEngine::coerce_types(session.working()).unwrap();
    session.replace_working(coerced);

    // The quartile bounds of the remaining ages are wide enough to keep the
    // 200-year-old; no row is removed.
    let (filtered, summary) = CleaningEngine::filter_outliers(session.working()).unwrap();
    assert_eq!(summary.rows_removed(), 0);
    session.replace_working(filtered);

    assert_eq!(session.working().height(), 5);
    assert_eq!(session.original().height(), 6);
}

#[test]
fn test_outlier_filter_removes_extreme_value() {
    let ds = load_dataset("numbers.csv");

    // [1..9, 1000]: Q1=3, Q3=8, bounds [-4.5, 15.5]; only 1000 falls outside.
    let (filtered, summary) = CleaningEngine::filter_outliers(&ds).unwrap();
    assert_eq!(summary.rows_removed(), 1);
    assert_eq!(filtered.height(), 9);
}

#[test]
fn test_commit_reports_shape_without_changing_it() {
    let ds = load_dataset("people.csv");
    let (committed, summary) = CleaningEngine::commit(&ds);
    assert_eq!(committed.shape(), ds.shape());
    assert!(summary.messages[0].contains("6 rows x 4 columns"));
}

// ============================================================================
// Ad-hoc Queries
// ============================================================================

#[test]
fn test_query_filter_on_fixture() {
    let ds = load_dataset("people.csv");

    let result = QueryExecutor::run("age > 28 and city == 'ham'", &ds).unwrap();
    let QueryResult::Table(table) = result else {
        panic!("expected a table");
    };
    assert_eq!(table.height(), 2);
}

#[test]
fn test_query_aggregate_on_cleaned_dataset() {
    let ds = load_dataset("numbers.csv");
    let (cleaned, _) = CleaningEngine::filter_outliers(&ds).unwrap();

    let result = QueryExecutor::run("max(value)", &cleaned).unwrap();
    let QueryResult::Scalar(max) = result else {
        panic!("expected a scalar");
    };
    assert_eq!(max, 9.0);
}

#[test]
fn test_query_cannot_reach_host_language() {
    let ds = load_dataset("people.csv");
    assert!(QueryExecutor::run("__import__('os').system('id')", &ds).is_err());
    assert!(QueryExecutor::run("drop(age)", &ds).is_err());
}

// ============================================================================
// Report Pipeline and Assembly
// ============================================================================

#[test]
fn test_report_sections_from_fixture() {
    let ds = load_dataset("people.csv");
    let pipeline = ReportPipeline::new(Arc::new(LocalNarrative), temp_options("sections"));

    let sections = pipeline.generate(&ds).unwrap();
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Dataset Overview",
            "Missing Value Analysis",
            "Outlier Analysis",
            "Univariate Analysis - age",
            "Univariate Analysis - income",
            "Bivariate Analysis - age vs income",
            "Multivariate Analysis",
            "Key Insights & Hypotheses",
        ]
    );
    for section in &sections {
        assert!(!section.narrative.is_empty());
    }
}

#[test]
fn test_unreachable_service_degrades_every_section() {
    let ds = load_dataset("people.csv");
    let pipeline = ReportPipeline::new(Arc::new(UnreachableService), temp_options("offline"));

    let sections = pipeline.generate(&ds).unwrap();
    assert_eq!(sections.len(), 8);
    for section in &sections {
        assert!(section.narrative.starts_with("[narrative unavailable:"));
    }
}

#[test]
fn test_assemble_report_end_to_end() {
    let ds = load_dataset("people.csv");
    let options = temp_options("assemble");
    let pipeline = ReportPipeline::new(Arc::new(LocalNarrative), options.clone());
    let sections = pipeline.generate(&ds).unwrap();

    // Font availability is platform-dependent; accept a rendered PDF or a
    // clean Assembly error, never a panic.
    match ReportAssembler::new(options).assemble(&sections) {
        Ok(path) => assert!(path.exists()),
        Err(e) => assert!(matches!(e, EdaError::Assembly(_))),
    }
}

#[test]
fn test_assemble_skips_dangling_image() {
    let options = temp_options("dangling");
    let sections = vec![
        eda_explorer::ReportSection::new("Dataset Overview", "Six rows, four columns.")
            .with_image(Some(PathBuf::from("/nonexistent/missing_values.png"))),
    ];

    match ReportAssembler::new(options).assemble(&sections) {
        Ok(path) => assert!(path.exists()),
        Err(e) => assert!(matches!(e, EdaError::Assembly(_))),
    }
}
