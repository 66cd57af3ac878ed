use crate::error::ExtractError;
use crate::spreadsheet::reference::Coordinate;
use glob::{MatchOptions, Pattern};

/// Bounded windows and sheet-selection rules used during extraction.
#[derive(Clone, Debug)]
pub struct ExtractionCriteria {
    /// Timesheet header fields are only searched in rows `1..=timesheet_header_rows`.
    pub timesheet_header_rows: u32,

    /// Rows below the notes anchor scanned for weather marks.
    pub weather_rows: u32,

    /// Columns scanned for weather marks.
    pub weather_columns: Vec<String>,

    /// Rows below the notes anchor scanned for pumping fields.
    pub pumping_rows: u32,

    /// Columns scanned for pumping fields.
    pub pumping_columns: Vec<String>,

    /// Sheet name patterns identifying the cover sheet (case-insensitive).
    pub cover_sheet_patterns: Vec<Pattern>,

    /// Minimum content-marker score for a sheet to be taken as the cover
    /// when no sheet name matches.
    pub cover_min_score: usize,

    /// Cell holding the report type on the cover sheet.
    pub report_type_cell: Coordinate,
}

/// Column letters from `first` to `last`, inclusive.
pub fn column_span(first: char, last: char) -> Vec<String> {
    (first..=last).map(|letter| letter.to_string()).collect()
}

impl ExtractionCriteria {
    /// Replaces the cover sheet patterns with glob patterns parsed from strings.
    pub fn with_cover_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, ExtractError> {
        self.cover_sheet_patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(&pattern.as_ref().to_lowercase()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Checks if a sheet name matches any cover pattern.
    pub fn is_cover_sheet(&self, sheet_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.cover_sheet_patterns
            .iter()
            .any(|pattern| pattern.matches_with(sheet_name, options))
    }
}

impl Default for ExtractionCriteria {
    fn default() -> Self {
        Self {
            timesheet_header_rows: 15,
            weather_rows: 9,
            weather_columns: column_span('A', 'J'),
            pumping_rows: 14,
            pumping_columns: column_span('G', 'P'),
            cover_sheet_patterns: ["*cubierta*", "*cover*", "*portada*"]
                .into_iter()
                .map(|pattern| Pattern::new(pattern).expect("Hardcode glob pattern"))
                .collect(),
            cover_min_score: 2,
            report_type_cell: Coordinate::new("A", 2).expect("Hardcode cell reference"),
        }
    }
}
