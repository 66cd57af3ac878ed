use serde::Serialize;
use thiserror::Error;

/// Main error type for the timesheet extractor.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Spreadsheet module errors
    #[error("{0}")]
    CoordinateError(#[from] crate::spreadsheet::reference::CoordinateError),

    #[error("{0}")]
    GridError(#[from] crate::spreadsheet::GridError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ExtractError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ExtractError::WithContextError(format!("{}: {}", message, e)))
    }
}

/// Non-fatal findings collected while extracting a document.
///
/// None of these abort extraction; they explain why a record set came back
/// empty or why a value was kept in its raw form.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A cell reference in the input could not be parsed and the cell was skipped.
    MalformedCoordinate { sheet: String, reference: String },
    /// No anchors, sections or markers were located for a record type.
    NoStructureFound { sheet: Option<String>, record: String },
    /// A numeric field had no parsable number and kept its raw text.
    AmbiguousNumericField { sheet: String, field: String, raw: String },
}
