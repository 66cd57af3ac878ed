//! # Cell Grid Module
//!
//! This module holds the sparse cell grid every extractor reads from: one
//! [`SheetGrid`] per sheet, each mapping a [`Coordinate`] to a [`CellValue`].
//! Grids are built either from a cell-map JSON document
//! (`{"Sheet": {"A1": "text", "B2": 42}}`) or directly from a spreadsheet
//! file through calamine.
use crate::error::{ExtractError, ResultMessage};
use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, warn};
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub mod cell;
pub mod criteria;
pub mod reference;
pub mod sheet;

pub use cell::CellValue;
pub use criteria::ExtractionCriteria;
pub use reference::{Coordinate, CoordinateError};
pub use sheet::SheetGrid;

/// Errors raised while building a grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// The cell map is not shaped as `{sheet: {reference: scalar}}`
    #[error("Invalid cell map: {0}")]
    InvalidLayout(String),

    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{name}'")]
    UnsupportedFormat { name: String },
}

/// A whole document: its sheets in workbook order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGrid {
    /// Document name (usually the source file stem)
    name: String,
    sheets: Vec<SheetGrid>,
    /// `(sheet, reference)` pairs skipped because the reference did not parse
    rejected: Vec<(String, String)>,
}

impl CellGrid {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Appends a sheet, keeping workbook order.
    pub fn with_sheet(mut self, sheet: SheetGrid) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheets(&self) -> &[SheetGrid] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|sheet| sheet.name() == name)
    }

    /// References that were skipped while loading.
    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }

    /// Builds a grid from a cell-map JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not shaped as a cell map.
    pub fn from_json_str(name: &str, json: &str) -> Result<Self, ExtractError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(name, &value)
    }

    /// Builds a grid from a reader yielding cell-map JSON.
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, ExtractError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(name, &value)
    }

    /// Builds a grid from an already parsed cell map.
    ///
    /// `null` values and zero-length strings are dropped. Objects and arrays
    /// are kept as their JSON text. Unparseable references are skipped and
    /// remembered in [`CellGrid::rejected`].
    pub fn from_json_value(name: &str, value: &serde_json::Value) -> Result<Self, ExtractError> {
        let workbook = value
            .as_object()
            .ok_or_else(|| GridError::InvalidLayout("top level must be an object of sheets".to_owned()))?;
        let mut grid = Self::new(name);
        for (sheet_name, cells) in workbook {
            let cells = cells.as_object().ok_or_else(|| {
                GridError::InvalidLayout(format!("sheet '{sheet_name}' must be an object of cells"))
            })?;
            let mut sheet = SheetGrid::new(sheet_name);
            for (reference, value) in cells {
                let value = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::Bool(value) => CellValue::Bool(*value),
                    serde_json::Value::Number(number) => match number.as_f64() {
                        Some(number) => CellValue::Number(number),
                        None => CellValue::Text(number.to_string()),
                    },
                    serde_json::Value::String(text) => CellValue::Text(text.to_owned()),
                    other => CellValue::Text(other.to_string()),
                };
                match Coordinate::parse(reference) {
                    Ok(coordinate) => sheet.insert(coordinate, value),
                    Err(error) => {
                        warn!("sheet '{sheet_name}': skipping cell: {error}");
                        grid.rejected.push((sheet_name.to_owned(), reference.to_owned()));
                    }
                }
            }
            debug!("sheet '{sheet_name}': {} cells loaded", sheet.len());
            grid.sheets.push(sheet);
        }
        Ok(grid)
    }

    /// Reads every sheet of a spreadsheet file into a grid.
    ///
    /// Supported formats: `.xlsx`, `.xlsm`, `.xlam`, `.xlsb`, `.xls`, `.xla`, `.ods`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file format is not supported
    /// - The file cannot be opened or read
    /// - A sheet cannot be decoded
    pub fn open<P>(path: P) -> Result<Self, ExtractError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        if !matches!(
            extension.as_deref(),
            Some("xlsx" | "xlsm" | "xlam" | "xlsb" | "xls" | "xla" | "ods")
        ) {
            return Err(GridError::UnsupportedFormat {
                name: path.to_string_lossy().to_string(),
            }
            .into());
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut workbook = open_workbook_auto(path)?;
        let mut grid = Self::new(&name);
        for sheet_name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(ExtractError::from)
                .with_prefix(&format!("sheet '{sheet_name}'"))?;
            let mut sheet = SheetGrid::new(&sheet_name);
            if let Some((row_start, column_start)) = range.start() {
                for (row, column, data) in range.used_cells() {
                    let Some(value) = data_to_value(data) else {
                        continue;
                    };
                    let row = row_start as usize + row + 1;
                    let column = column_start as usize + column;
                    let coordinate = u32::try_from(row)
                        .map_err(|_| CoordinateError::MalformedCoordinate(format!("row {row}")))
                        .and_then(|row| Coordinate::new(&reference::index_to_col(column), row))?;
                    sheet.insert(coordinate, value);
                }
            }
            debug!("sheet '{sheet_name}': {} cells read", sheet.len());
            grid.sheets.push(sheet);
        }
        Ok(grid)
    }
}

/// Converts a calamine cell to a grid value; empty cells yield `None`.
fn data_to_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::Int(value) => Some(CellValue::Number(*value as f64)),
        Data::Float(value) => Some(CellValue::Number(*value)),
        Data::Bool(value) => Some(CellValue::Bool(*value)),
        Data::String(value) if value.is_empty() => None,
        Data::String(value) => Some(CellValue::Text(value.to_owned())),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            let datetime = value.as_datetime()?;
            // Serial values below one day carry a time only
            let text = if serial < 1.0 {
                datetime.time().to_string()
            } else if serial.fract() == 0.0 {
                datetime.date().to_string()
            } else {
                datetime.to_string()
            };
            Some(CellValue::Text(text))
        }
        Data::DateTimeIso(value) => Some(CellValue::Text(value.replace('T', " "))),
        Data::DurationIso(value) => Some(CellValue::Text(value.to_owned())),
        Data::Error(error) => Some(CellValue::Text(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn json_cell_map_keeps_sheet_order_and_drops_nulls() {
        let grid = CellGrid::from_json_str(
            "report",
            r#"{"Zeta": {"A1": "x"}, "Alpha": {"B2": 7, "C3": null, "D4": "", "E5": true}}"#,
        )
        .unwrap();

        let names: Vec<&str> = grid.sheets().iter().map(SheetGrid::name).collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
        let alpha = grid.sheet("Alpha").unwrap();
        assert_eq!(alpha.len(), 2);
        assert_eq!(alpha.get_at("B", 2), Some(&CellValue::Number(7.0)));
        assert_eq!(alpha.get_at("E", 5), Some(&CellValue::Bool(true)));
        assert_eq!(grid.name(), "report");
    }

    #[test]
    fn malformed_references_are_skipped_and_recorded() {
        let grid = CellGrid::from_json_str("doc", r#"{"S": {"A1": "ok", "??": "bad", "B0": "bad"}}"#).unwrap();

        assert_eq!(grid.sheet("S").unwrap().len(), 1);
        assert_eq!(
            grid.rejected(),
            [("S".to_owned(), "??".to_owned()), ("S".to_owned(), "B0".to_owned())]
        );
    }

    #[test]
    fn invalid_layouts_are_errors() {
        assert!(CellGrid::from_json_str("doc", "[1, 2]").is_err());
        assert!(CellGrid::from_json_str("doc", r#"{"S": 3}"#).is_err());
        assert!(CellGrid::from_json_str("doc", "not json").is_err());
    }

    fn date_time(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
    }

    #[test]
    fn date_serials_render_by_their_fraction() {
        assert_eq!(data_to_value(&date_time(45292.0)), Some(CellValue::from("2024-01-01")));
        assert_eq!(data_to_value(&date_time(0.5)), Some(CellValue::from("12:00:00")));
        assert_eq!(data_to_value(&date_time(45292.75)), Some(CellValue::from("2024-01-01 18:00:00")));
    }

    #[test]
    fn text_like_cells_render_as_text() {
        assert_eq!(
            data_to_value(&Data::DateTimeIso("2024-01-01T08:30:00".to_owned())),
            Some(CellValue::from("2024-01-01 08:30:00"))
        );
        assert_eq!(data_to_value(&Data::Error(CellErrorType::Div0)), Some(CellValue::from("#DIV/0!")));
        assert_eq!(data_to_value(&Data::String("Loading".to_owned())), Some(CellValue::from("Loading")));
        assert_eq!(data_to_value(&Data::Int(3)), Some(CellValue::Number(3.0)));
        assert_eq!(data_to_value(&Data::String(String::new())), None);
        assert_eq!(data_to_value(&Data::Empty), None);
    }

    #[test]
    fn unsupported_extension_is_rejected_before_opening() {
        let error = CellGrid::open("notes.txt").unwrap_err();
        assert!(matches!(
            error,
            ExtractError::GridError(GridError::UnsupportedFormat { .. })
        ));
    }
}
