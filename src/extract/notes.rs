use crate::extract::field::{
    guess_numbers, scan_table, FieldExtractor, FieldValue, FieldValues, TableWindow, PUMPING_GUESSES,
};
use crate::extract::lexicon::{ConditionTerm, Lexicon};
use crate::spreadsheet::{CellGrid, ExtractionCriteria, SheetGrid};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the notes sub-tables of a sheet are anchored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructureDescriptor {
    pub special_notes_found: bool,
    pub general_notes_found: bool,
    pub special_notes_col: Option<String>,
    pub general_notes_col: Option<String>,
    /// Row of the special notes anchor, or of the general notes anchor when
    /// there is no special one
    pub start_row: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WeatherConditions {
    pub weather_conditions: Vec<String>,
    pub sea_conditions: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemarksAndNotes {
    pub remarks: Vec<String>,
    pub special_notes: Vec<String>,
    pub general_notes: Vec<String>,
}

/// Notes, weather and pumping data of a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NotesRecord {
    pub source_sheet: String,
    pub timesheet_header: FieldValues,
    pub weather_conditions: WeatherConditions,
    pub pumping_data: BTreeMap<String, Option<FieldValue>>,
    pub remarks_and_notes: RemarksAndNotes,
    pub vessel_information: FieldValues,
    pub table_structure: Option<StructureDescriptor>,
    /// `(field key, raw text)` of numeric pumping fields that kept their raw text
    #[serde(skip)]
    pub ambiguous_fields: Vec<(String, String)>,
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// First sheet whose text carries a notes marker.
pub fn select_notes_sheet<'g>(grid: &'g CellGrid, lexicon: &Lexicon) -> Option<&'g SheetGrid> {
    grid.sheets()
        .iter()
        .find(|sheet| contains_any(&sheet.joined_text().to_lowercase(), lexicon.notes_sheet_markers))
}

/// Locates the special and general notes anchors. The first anchor of each
/// kind counts; `None` if neither is present.
pub fn find_structure(sheet: &SheetGrid, lexicon: &Lexicon) -> Option<StructureDescriptor> {
    let mut structure = StructureDescriptor::default();
    for (coordinate, text) in sheet.text_cells() {
        let text = text.to_lowercase();
        if contains_any(&text, lexicon.special_notes_markers) {
            if !structure.special_notes_found {
                structure.special_notes_found = true;
                structure.special_notes_col = Some(coordinate.column().to_owned());
                structure.start_row = Some(coordinate.row());
            }
        } else if contains_any(&text, lexicon.general_notes_markers) && !structure.general_notes_found {
            structure.general_notes_found = true;
            structure.general_notes_col = Some(coordinate.column().to_owned());
            if !structure.special_notes_found {
                structure.start_row = Some(coordinate.row());
            }
        }
    }
    (structure.special_notes_found || structure.general_notes_found).then_some(structure)
}

fn marked_terms(text: &str, terms: &[ConditionTerm], found: &mut Vec<String>) {
    let lowered = text.to_lowercase();
    for term in terms {
        let named = term
            .keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()));
        if named && !found.iter().any(|seen| seen == term.canonical) {
            found.push(term.canonical.to_owned());
        }
    }
}

/// Weather and sea terms marked with an `X` in the window below the notes anchor.
pub fn extract_weather(
    sheet: &SheetGrid,
    structure: &StructureDescriptor,
    criteria: &ExtractionCriteria,
    lexicon: &Lexicon,
) -> WeatherConditions {
    let mut conditions = WeatherConditions::default();
    let Some(start_row) = structure.start_row else {
        return conditions;
    };
    let window = TableWindow::below(sheet, start_row, criteria.weather_rows, &criteria.weather_columns);
    for (_, value) in window.cells(sheet) {
        let Some(text) = value.as_text() else {
            continue;
        };
        if !text.contains('X') {
            continue;
        }
        marked_terms(text, lexicon.weather_terms, &mut conditions.weather_conditions);
        marked_terms(text, lexicon.sea_terms, &mut conditions.sea_conditions);
    }
    conditions
}

/// Remark texts plus the full text of every notes anchor cell.
pub fn extract_remarks(sheet: &SheetGrid, lexicon: &Lexicon) -> RemarksAndNotes {
    let mut notes = RemarksAndNotes::default();
    for (_, text) in sheet.text_cells() {
        let text = text.trim();
        let lowered = text.to_lowercase();
        if contains_any(&lowered, lexicon.remark_labels) {
            if let Some((_, remark)) = text.split_once(':') {
                let remark = remark.trim();
                if !remark.is_empty() && remark != "-" {
                    notes.remarks.push(remark.to_owned());
                }
            }
        }
        if contains_any(&lowered, lexicon.special_notes_markers) {
            notes.special_notes.push(text.to_owned());
        }
        if contains_any(&lowered, lexicon.general_notes_markers) {
            notes.general_notes.push(text.to_owned());
        }
    }
    notes
}

/// Standard disclaimer sentences found anywhere in the sheet text.
pub fn extract_vessel_information(sheet: &SheetGrid, lexicon: &Lexicon) -> FieldValues {
    let text = sheet.joined_text();
    lexicon
        .vessel_info_patterns
        .iter()
        .map(|(key, regex)| {
            let found = regex.find(&text).map(|found| found.as_str().trim().to_owned());
            ((*key).to_owned(), found)
        })
        .collect()
}

/// Extracts every notes sub-record from one sheet.
pub fn extract_notes(sheet: &SheetGrid, criteria: &ExtractionCriteria, lexicon: &Lexicon) -> NotesRecord {
    let structure = find_structure(sheet, lexicon);
    let mut pumping_data: BTreeMap<String, Option<FieldValue>> = lexicon
        .pumping_fields
        .iter()
        .map(|field| (field.key.to_owned(), None))
        .collect();
    let mut ambiguous_fields = Vec::new();
    let mut weather_conditions = WeatherConditions::default();

    let anchored = structure
        .as_ref()
        .and_then(|found| found.start_row.map(|row| (found, row)));
    if let Some((found, start_row)) = anchored {
        weather_conditions = extract_weather(sheet, found, criteria, lexicon);
        let window = TableWindow::below(sheet, start_row, criteria.pumping_rows, &criteria.pumping_columns);
        let scan = scan_table(sheet, &window, lexicon.pumping_fields);
        pumping_data = scan.values;
        ambiguous_fields = scan.ambiguous;
        guess_numbers(sheet, &mut pumping_data, PUMPING_GUESSES);
    } else {
        debug!("sheet '{}': no notes anchors", sheet.name());
    }

    NotesRecord {
        source_sheet: sheet.name().to_owned(),
        timesheet_header: FieldExtractor::new(lexicon.timesheet_fields, lexicon)
            .with_row_limit(criteria.timesheet_header_rows)
            .extract(sheet),
        weather_conditions,
        pumping_data,
        remarks_and_notes: extract_remarks(sheet, lexicon),
        vessel_information: extract_vessel_information(sheet, lexicon),
        table_structure: structure,
        ambiguous_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_sheet() -> SheetGrid {
        SheetGrid::new("TIMESHEET")
            .with_cell("B2", "Vessel")
            .with_cell("D2", "MT Aurora")
            .with_cell("B3", "Product: Diesel")
            .with_cell("A10", "Special Notes: none")
            .with_cell("G10", "General Notes")
            .with_cell("A11", "Weather conditions")
            .with_cell("B12", "Rain X")
            .with_cell("C12", "Clear")
            .with_cell("D12", "Calm X")
            .with_cell("E13", "Rain - X")
            .with_cell("G12", "Pumping Time")
            .with_cell("G13", "-12,5 hrs")
            .with_cell("H12", "Last Cargo")
            .with_cell("H13", "Gasoil")
            .with_cell("K30", -420.0)
            .with_cell("A31", "C.- Remarks: Hoses drained")
            .with_cell("A32", "Remarks: -")
            .with_cell("A40", "Any information as submitted above resulting from information obtained from Vessel's")
            .with_cell("A41", "records, cannot be guaranteed as accurate.")
    }

    #[test]
    fn structure_prefers_special_notes_row() {
        let structure = find_structure(&notes_sheet(), &Lexicon::default()).unwrap();

        assert_eq!(
            structure,
            StructureDescriptor {
                special_notes_found: true,
                general_notes_found: true,
                special_notes_col: Some("A".to_owned()),
                general_notes_col: Some("G".to_owned()),
                start_row: Some(10),
            }
        );
        assert_eq!(find_structure(&SheetGrid::new("x").with_cell("A1", "Event"), &Lexicon::default()), None);
    }

    #[test]
    fn general_notes_alone_sets_start_row() {
        let sheet = SheetGrid::new("x").with_cell("C7", "Notas Generales");

        let structure = find_structure(&sheet, &Lexicon::default()).unwrap();
        assert!(!structure.special_notes_found);
        assert_eq!(structure.start_row, Some(7));
    }

    #[test]
    fn full_notes_record() {
        let notes = extract_notes(&notes_sheet(), &ExtractionCriteria::default(), &Lexicon::default());

        assert_eq!(notes.source_sheet, "TIMESHEET");
        assert_eq!(notes.timesheet_header["vessel"].as_deref(), Some("MT Aurora"));
        assert_eq!(notes.timesheet_header["product"].as_deref(), Some("Diesel"));
        assert_eq!(notes.weather_conditions.weather_conditions, ["rain"]);
        assert_eq!(notes.weather_conditions.sea_conditions, ["calm"]);
        assert_eq!(notes.pumping_data["pumping_time"], Some(FieldValue::Number(-12.5)));
        assert_eq!(notes.pumping_data["pumping_rate"], Some(FieldValue::Number(-420.0)));
        assert_eq!(notes.pumping_data["last_cargo"], Some(FieldValue::Text("Gasoil".to_owned())));
        assert_eq!(notes.remarks_and_notes.remarks, ["Hoses drained"]);
        assert_eq!(notes.remarks_and_notes.special_notes, ["Special Notes: none"]);
        assert_eq!(notes.remarks_and_notes.general_notes, ["General Notes"]);
        assert!(notes.vessel_information["any_information_submitted"].is_some());
        assert_eq!(notes.vessel_information["standard_procedure"], None);
    }

    #[test]
    fn notes_without_anchors_skip_tables() {
        let sheet = SheetGrid::new("Notes").with_cell("A1", "Pumping Time").with_cell("A2", "-10");

        let notes = extract_notes(&sheet, &ExtractionCriteria::default(), &Lexicon::default());
        assert_eq!(notes.table_structure, None);
        assert_eq!(notes.pumping_data["pumping_time"], None);
        assert_eq!(notes.weather_conditions, WeatherConditions::default());
    }

    #[test]
    fn notes_sheet_is_first_with_marker() {
        let grid = CellGrid::new("doc")
            .with_sheet(SheetGrid::new("Cover").with_cell("A1", "M/T 'X'"))
            .with_sheet(SheetGrid::new("TS1").with_cell("A9", "Weather conditions"))
            .with_sheet(SheetGrid::new("TS2").with_cell("A9", "Special Notes"));

        assert_eq!(select_notes_sheet(&grid, &Lexicon::default()).map(SheetGrid::name), Some("TS1"));
    }
}
