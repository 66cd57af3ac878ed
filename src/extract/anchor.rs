use crate::extract::lexicon::{LabelRole, SectionPattern, Variant};
use crate::spreadsheet::{Coordinate, SheetGrid};
use log::trace;
use serde::Serialize;
use std::collections::BTreeMap;

/// A located label cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub role: LabelRole,
    pub coordinate: Coordinate,
    pub variant: Variant,
}

/// Column layout of one timesheet section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionDescriptor {
    pub format: Variant,
    pub event_column: String,
    pub date_column: String,
    pub time_column: String,
    /// Row holding the three labels
    pub header_row: u32,
    /// First data row (`header_row + 1`)
    pub start_row: u32,
    /// Last row the section may reach before the next section's header in the same column
    pub last_row: Option<u32>,
}

/// Finds every cell whose trimmed, lowercased text is a label of `pattern`.
///
/// Date labels outside the pattern's pinned date column are ignored.
pub fn locate_anchors(sheet: &SheetGrid, pattern: &SectionPattern) -> Vec<Anchor> {
    sheet
        .text_cells()
        .filter_map(|(coordinate, text)| {
            let role = pattern.role_of(&text.trim().to_lowercase())?;
            if role == LabelRole::Date
                && pattern
                    .date_column
                    .is_some_and(|column| column != coordinate.column())
            {
                return None;
            }
            Some(Anchor {
                role,
                coordinate: coordinate.clone(),
                variant: pattern.variant,
            })
        })
        .collect()
}

/// Removes and returns the candidate closest to `origin` by column, the
/// leftmost one on ties.
fn take_nearest<'a>(candidates: &mut Vec<&'a Coordinate>, origin: &Coordinate) -> Option<&'a Coordinate> {
    let index = candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, candidate)| candidate.column_index().abs_diff(origin.column_index()))
        .map(|(index, _)| index)?;
    Some(candidates.remove(index))
}

/// Groups one variant's anchors on a row into section descriptors.
///
/// Event labels are taken left to right and each one pairs with the nearest
/// unused date and time labels. Labels left without a partner are ignored;
/// a row with no complete group yields `None`.
fn group_row(row: u32, anchors: &[&Anchor], variant: Variant) -> Option<Vec<SectionDescriptor>> {
    let columns = |role: LabelRole| {
        let mut found: Vec<&Coordinate> = anchors
            .iter()
            .filter(|anchor| anchor.role == role)
            .map(|anchor| &anchor.coordinate)
            .collect();
        found.sort_by_key(|coordinate| coordinate.column_index());
        found
    };
    let events = columns(LabelRole::Event);
    let mut dates = columns(LabelRole::Date);
    let mut times = columns(LabelRole::Time);
    let mut sections = Vec::new();
    for event in events {
        let (Some(date), Some(time)) = (take_nearest(&mut dates, event), take_nearest(&mut times, event)) else {
            break;
        };
        sections.push(SectionDescriptor {
            format: variant,
            event_column: event.column().to_owned(),
            date_column: date.column().to_owned(),
            time_column: time.column().to_owned(),
            header_row: row,
            start_row: row + 1,
            last_row: None,
        });
    }
    (!sections.is_empty()).then_some(sections)
}

/// Locates all timesheet sections of a sheet.
///
/// Patterns are tried in order for each row and the first one that fully
/// matches claims the row, so a row never mixes variants. Sections come back
/// top to bottom, left to right.
pub fn locate_sections(sheet: &SheetGrid, patterns: &[SectionPattern]) -> Vec<SectionDescriptor> {
    let per_pattern: Vec<BTreeMap<u32, Vec<Anchor>>> = patterns
        .iter()
        .map(|pattern| {
            let mut rows: BTreeMap<u32, Vec<Anchor>> = BTreeMap::new();
            for anchor in locate_anchors(sheet, pattern) {
                rows.entry(anchor.coordinate.row()).or_default().push(anchor);
            }
            rows
        })
        .collect();

    let mut header_rows: Vec<u32> = per_pattern.iter().flat_map(|rows| rows.keys().copied()).collect();
    header_rows.sort_unstable();
    header_rows.dedup();

    let mut sections = Vec::new();
    for row in header_rows {
        let claimed = patterns.iter().zip(&per_pattern).find_map(|(pattern, rows)| {
            let anchors: Vec<&Anchor> = rows.get(&row)?.iter().collect();
            group_row(row, &anchors, pattern.variant)
        });
        match claimed {
            Some(found) => sections.extend(found),
            None => trace!("sheet '{}': row {row} has labels but no complete section header", sheet.name()),
        }
    }

    // A section ends before the next header in its own event column
    let headers: Vec<(String, u32)> = sections
        .iter()
        .map(|section| (section.event_column.clone(), section.header_row))
        .collect();
    for section in &mut sections {
        section.last_row = headers
            .iter()
            .filter(|(column, row)| *column == section.event_column && *row > section.header_row)
            .map(|(_, row)| row - 1)
            .min();
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lexicon::SECTION_PATTERNS;

    #[test]
    fn english_header_anywhere_on_row() {
        let sheet = SheetGrid::new("TIMESHEET")
            .with_cell("A5", "Event")
            .with_cell("B5", " date ")
            .with_cell("C5", "TIME");

        let sections = locate_sections(&sheet, SECTION_PATTERNS);
        assert_eq!(
            sections,
            [SectionDescriptor {
                format: Variant::English,
                event_column: "A".to_owned(),
                date_column: "B".to_owned(),
                time_column: "C".to_owned(),
                header_row: 5,
                start_row: 6,
                last_row: None,
            }]
        );
    }

    #[test]
    fn spanish_header_requires_date_in_column_a() {
        let pinned = SheetGrid::new("TS")
            .with_cell("A3", "FECHA")
            .with_cell("B3", "HRS")
            .with_cell("C3", "EVENTO");
        let loose = SheetGrid::new("TS")
            .with_cell("B3", "FECHA")
            .with_cell("C3", "HRS")
            .with_cell("D3", "EVENTO");

        let sections = locate_sections(&pinned, SECTION_PATTERNS);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].format, Variant::Spanish);
        assert_eq!(sections[0].event_column, "C");
        assert!(locate_sections(&loose, SECTION_PATTERNS).is_empty());
    }

    #[test]
    fn mixed_language_rows_are_rejected() {
        let sheet = SheetGrid::new("TS")
            .with_cell("B2", "Evento")
            .with_cell("C2", "Date")
            .with_cell("D2", "Hora");

        assert!(locate_sections(&sheet, SECTION_PATTERNS).is_empty());
    }

    #[test]
    fn incomplete_rows_are_discarded() {
        let sheet = SheetGrid::new("TS")
            .with_cell("A1", "Event")
            .with_cell("B1", "Date")
            .with_cell("A2", "Time");

        assert!(locate_sections(&sheet, SECTION_PATTERNS).is_empty());
    }

    #[test]
    fn stray_labels_do_not_break_a_complete_header() {
        let sheet = SheetGrid::new("TS")
            .with_cell("A5", "Event")
            .with_cell("B5", "Date")
            .with_cell("C5", "Time")
            .with_cell("H5", "Date");

        let sections = locate_sections(&sheet, SECTION_PATTERNS);
        let layout: Vec<(&str, &str, &str)> = sections
            .iter()
            .map(|s| (s.event_column.as_str(), s.date_column.as_str(), s.time_column.as_str()))
            .collect();
        assert_eq!(layout, [("A", "B", "C")]);
    }

    #[test]
    fn labels_pair_with_their_nearest_partners() {
        let sheet = SheetGrid::new("TS")
            .with_cell("B1", "Time")
            .with_cell("C1", "Event")
            .with_cell("D1", "Date")
            .with_cell("F1", "Event")
            .with_cell("G1", "Time")
            .with_cell("H1", "Date")
            .with_cell("K1", "Event");

        let sections = locate_sections(&sheet, SECTION_PATTERNS);
        let layout: Vec<(&str, &str, &str)> = sections
            .iter()
            .map(|s| (s.event_column.as_str(), s.date_column.as_str(), s.time_column.as_str()))
            .collect();
        assert_eq!(layout, [("C", "D", "B"), ("F", "H", "G")]);
    }

    #[test]
    fn several_sections_per_sheet() {
        let sheet = SheetGrid::new("TS")
            .with_cell("A1", "Event")
            .with_cell("B1", "Date")
            .with_cell("C1", "Time")
            .with_cell("E1", "Event")
            .with_cell("F1", "Date")
            .with_cell("G1", "Time")
            .with_cell("A10", "Event")
            .with_cell("B10", "Date")
            .with_cell("C10", "Time");

        let sections = locate_sections(&sheet, SECTION_PATTERNS);
        let layout: Vec<(&str, u32, Option<u32>)> = sections
            .iter()
            .map(|s| (s.event_column.as_str(), s.header_row, s.last_row))
            .collect();
        assert_eq!(layout, [("A", 1, Some(9)), ("E", 1, None), ("A", 10, None)]);
    }

    #[test]
    fn anchors_carry_role_and_variant() {
        let sheet = SheetGrid::new("TS").with_cell("D4", "hrs").with_cell("A4", "Fecha");

        let anchors = locate_anchors(&sheet, &SECTION_PATTERNS[1]);
        let roles: Vec<(LabelRole, String)> = anchors
            .iter()
            .map(|a| (a.role, a.coordinate.to_string()))
            .collect();
        assert_eq!(roles, [(LabelRole::Date, "A4".to_owned()), (LabelRole::Time, "D4".to_owned())]);
        assert!(anchors.iter().all(|a| a.variant == Variant::Spanish));
    }
}
