//! Excel-style cell references (`A5`, `D12`) and neighbour arithmetic.
//!
//! Parsing accepts any number of column letters, but [`Coordinate::adjacent`]
//! only shifts single-letter columns inside `A..=Z`. Shifting past `Z` (or before
//! `A`) is reported as [`CoordinateError::ColumnOutOfRange`] instead of wrapping.
//! Rows are limited to `1..=MAX_ROW`, the row count of a worksheet.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::LazyLock;
use thiserror::Error;

/// Last row number a worksheet can hold.
pub const MAX_ROW: u32 = 1_048_576;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(\d+)$").expect("Hardcode regex pattern"));

/// Errors related to cell reference parsing and arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("Malformed cell reference '{0}'")]
    MalformedCoordinate(String),

    #[error("Column '{column}' shifted by {delta} leaves the single-letter range A..Z")]
    ColumnOutOfRange { column: String, delta: i32 },

    #[error("Row {row} shifted by {delta} leaves the row range 1..={max}", max = MAX_ROW)]
    RowOutOfRange { row: u32, delta: i32 },
}

/// Converts column letters to a 0-based column index (A = 0, Z = 25, AA = 26).
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|c| c as usize - 'A' as usize + 1)
        .reduce(|index, digit| index * 26 + digit)
        .map(|column| column - 1)
}

/// Converts a 0-based column index back to column letters.
pub fn index_to_col(index: usize) -> String {
    let mut column = index + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        let digit = char::from_u32(65 + (column % 26) as u32).expect("Hardcode letters");
        column /= 26;
        letters.insert(0, digit)
    }
    letters
}

/// A cell position: column letters plus 1-based row number.
///
/// Ordering is row-major (row first, then column index), which is the order
/// cells are scanned in everywhere downstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    column: String,
    row: u32,
}

impl Coordinate {
    /// Builds a coordinate from already validated parts.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCoordinate` when the column is not alphabetic or the
    /// row is outside `1..=MAX_ROW`.
    pub fn new(column: &str, row: u32) -> Result<Self, CoordinateError> {
        if col_to_index(column).is_none() || !(1..=MAX_ROW).contains(&row) {
            return Err(CoordinateError::MalformedCoordinate(format!("{column}{row}")));
        }
        Ok(Self {
            column: column.to_ascii_uppercase(),
            row,
        })
    }

    /// Splits a reference such as `B12` into its column and row parts.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCoordinate` if either part is missing or the row is not
    /// an integer in `1..=MAX_ROW`.
    pub fn parse(reference: &str) -> Result<Self, CoordinateError> {
        let malformed = || CoordinateError::MalformedCoordinate(reference.to_owned());
        let normalized = reference.trim().to_ascii_uppercase();
        let captures = REFERENCE_PATTERN.captures(&normalized).ok_or_else(malformed)?;
        let row = captures[2]
            .parse::<u32>()
            .ok()
            .filter(|row| (1..=MAX_ROW).contains(row))
            .ok_or_else(malformed)?;
        Ok(Self {
            column: captures[1].to_owned(),
            row,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    /// 0-based column index.
    pub fn column_index(&self) -> usize {
        col_to_index(&self.column).unwrap_or_default()
    }

    /// Computes the neighbouring coordinate `delta_columns` to the right and
    /// `delta_rows` down (negative values move left/up).
    ///
    /// # Errors
    ///
    /// * `ColumnOutOfRange` - the column has more than one letter, or the shift
    ///   leaves `A..=Z`.
    /// * `RowOutOfRange` - the resulting row would leave `1..=MAX_ROW`.
    pub fn adjacent(&self, delta_columns: i32, delta_rows: i32) -> Result<Self, CoordinateError> {
        let column = if delta_columns == 0 {
            self.column.clone()
        } else {
            let out_of_range = || CoordinateError::ColumnOutOfRange {
                column: self.column.clone(),
                delta: delta_columns,
            };
            let mut letters = self.column.bytes();
            let letter = match (letters.next(), letters.next()) {
                (Some(letter), None) => letter,
                _ => return Err(out_of_range()),
            };
            let shifted = i32::from(letter) + delta_columns;
            if !(i32::from(b'A')..=i32::from(b'Z')).contains(&shifted) {
                return Err(out_of_range());
            }
            char::from(shifted as u8).to_string()
        };
        let row = i64::from(self.row) + i64::from(delta_rows);
        let row = u32::try_from(row)
            .ok()
            .filter(|row| (1..=MAX_ROW).contains(row))
            .ok_or(CoordinateError::RowOutOfRange {
                row: self.row,
                delta: delta_rows,
            })?;
        Ok(Self { column, row })
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.len().cmp(&other.column.len()))
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
