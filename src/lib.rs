//! # Timesheet Extractor
//!
//! Reads maritime operation reports (cargo transfer timesheets, cover sheets
//! and operational notes) from a spreadsheet cell grid and turns them into
//! structured records.
//!
//! ## Features
//!
//! - **Grid loading**: cell-map JSON documents or spreadsheet files
//!   (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.xla`, `.xlam`, `.ods`)
//! - **Bilingual layouts**: English and Spanish timesheet headers and labels
//! - **Event extraction**: one record per timesheet row, with normalized date
//!   and time and a semantic category
//! - **Header and notes**: vessels, products, references, operational fields,
//!   weather, pumping data and remarks
//! - **Best effort**: missing structure yields empty records and a diagnostic,
//!   never an error
//!
//! ## Example
//!
//! ```
//! use timesheet_extractor::extract::extract_report;
//! use timesheet_extractor::spreadsheet::CellGrid;
//!
//! let grid = CellGrid::from_json_str(
//!     "report",
//!     r#"{"TIMESHEET": {"A5": "Event", "B5": "Date", "C5": "Time",
//!                       "A6": "Loading commenced", "B6": "2024-01-01", "C6": "0800"}}"#,
//! )?;
//! let report = extract_report(&grid);
//! assert_eq!(report.events[0].time.as_deref(), Some("08:00"));
//! # Ok::<(), timesheet_extractor::error::ExtractError>(())
//! ```
pub mod error;
pub mod extract;
pub mod spreadsheet;

pub use error::{Diagnostic, ExtractError};
pub use extract::{extract_report, Report, ReportExtractor};
pub use spreadsheet::{CellGrid, ExtractionCriteria};
