use crate::extract::anchor::SectionDescriptor;
use crate::extract::classify::{classify, format_time, Category};
use crate::extract::lexicon::{Lexicon, Variant};
use crate::spreadsheet::SheetGrid;
use serde::Serialize;

/// One row of a timesheet section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventRecord {
    pub description: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub section_format: Variant,
    pub sheet_name: String,
    /// 1-based position of the section within its sheet
    pub section_index: usize,
    pub row: u32,
    pub category: Category,
}

/// Drops anything after the first whitespace ("2024-01-01 00:00:00" -> "2024-01-01").
pub fn format_date(date: &str) -> String {
    date.split_whitespace().next().unwrap_or_default().to_owned()
}

/// Reads a role column at `row` as trimmed text; absent or blank cells are `None`.
fn cell_text(sheet: &SheetGrid, column: &str, row: u32) -> Option<String> {
    sheet
        .get_at(column, row)
        .map(|value| value.to_trimmed())
        .filter(|text| !text.is_empty())
}

/// Walks a section downwards from its start row, one record per row.
///
/// The walk stops at the first row whose event cell is absent or blank, or
/// after the section's last row. Dates and times are normalized but never
/// validated.
pub fn walk_section(
    sheet: &SheetGrid,
    section: &SectionDescriptor,
    section_index: usize,
    lexicon: &Lexicon,
) -> Vec<EventRecord> {
    let mut events = Vec::new();
    let mut row = section.start_row;
    while section.last_row.is_none_or(|last| row <= last) {
        let Some(description) = cell_text(sheet, &section.event_column, row) else {
            break;
        };
        events.push(EventRecord {
            category: classify(&description, lexicon.categories),
            description,
            date: cell_text(sheet, &section.date_column, row).map(|date| format_date(&date)),
            time: cell_text(sheet, &section.time_column, row).map(|time| format_time(&time)),
            section_format: section.format,
            sheet_name: sheet.name().to_owned(),
            section_index,
            row,
        });
        row += 1;
    }
    events
}
