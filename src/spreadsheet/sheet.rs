use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::Coordinate;
use std::collections::BTreeMap;

/// One sheet of a cell grid: a sparse map from coordinate to value.
///
/// Absence of a key means the cell is empty. Cells are kept in row-major
/// order so every scan visits them top-to-bottom, left-to-right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetGrid {
    /// Sheet name
    name: String,
    /// All non-empty cells in the sheet
    cells: BTreeMap<Coordinate, CellValue>,
    /// Actual data range (determined from cell data)
    row_lower_bound: Option<u32>,
    row_upper_bound: Option<u32>,
}

impl SheetGrid {
    /// Creates an empty sheet.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Adds a cell, replacing any previous value at the same coordinate.
    /// Zero-length strings are dropped so that no cell maps to an empty value.
    pub fn insert(&mut self, coordinate: Coordinate, value: CellValue) {
        if matches!(&value, CellValue::Text(text) if text.is_empty()) {
            self.cells.remove(&coordinate);
            return;
        }
        self.update_bound(coordinate.row());
        self.cells.insert(coordinate, value);
    }

    /// Builder-style variant of [`SheetGrid::insert`] for references known to be valid.
    pub fn with_cell(mut self, reference: &str, value: impl Into<CellValue>) -> Self {
        if let Ok(coordinate) = Coordinate::parse(reference) {
            self.insert(coordinate, value.into());
        }
        self
    }

    /// Updates the actual row boundaries based on cell positions.
    fn update_bound(&mut self, row: u32) {
        if self.row_lower_bound.map(|lower| row < lower).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|upper| upper < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
    }

    /// Last row holding data, if any.
    pub fn row_upper_bound(&self) -> Option<u32> {
        self.row_upper_bound
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&CellValue> {
        self.cells.get(coordinate)
    }

    /// Looks up a cell by column letters and row.
    pub fn get_at(&self, column: &str, row: u32) -> Option<&CellValue> {
        Coordinate::new(column, row)
            .ok()
            .and_then(|coordinate| self.cells.get(&coordinate))
    }

    /// Iterates all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&Coordinate, &CellValue)> {
        self.cells.iter()
    }

    /// Iterates string cells only, in row-major order.
    pub fn text_cells(&self) -> impl Iterator<Item = (&Coordinate, &str)> {
        self.cells
            .iter()
            .filter_map(|(coordinate, value)| value.as_text().map(|text| (coordinate, text)))
    }

    /// Concatenates every cell value, space separated, in row-major order.
    pub fn joined_text(&self) -> String {
        self.cells
            .values()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_initial() {
        let sheet = SheetGrid::new("TIMESHEET");

        assert!(sheet.is_empty());
        assert_eq!(sheet.name(), "TIMESHEET");
        assert_eq!(sheet.row_upper_bound(), None);
    }

    #[test]
    fn sheet_update() {
        let sheet = SheetGrid::new("")
            .with_cell("C3", "c")
            .with_cell("A1", "a")
            .with_cell("B3", 2.0)
            .with_cell("AA1", "aa");

        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound(), Some(3));

        let order: Vec<String> = sheet.cells().map(|(c, _)| c.to_string()).collect();
        assert_eq!(order, ["A1", "AA1", "B3", "C3"]);
        assert_eq!(sheet.joined_text(), "a aa 2 c");
    }

    #[test]
    fn empty_strings_are_not_stored() {
        let sheet = SheetGrid::new("").with_cell("A1", "").with_cell("A2", " ");

        assert_eq!(sheet.get_at("A", 1), None);
        assert_eq!(sheet.get_at("A", 2), Some(&CellValue::from(" ")));
    }

    #[test]
    fn text_cells_skip_numbers() {
        let sheet = SheetGrid::new("").with_cell("A1", 5.0).with_cell("B1", "Date");

        let texts: Vec<&str> = sheet.text_cells().map(|(_, text)| text).collect();
        assert_eq!(texts, ["Date"]);
    }
}
