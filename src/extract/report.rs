use crate::error::{Diagnostic, ExtractError};
use crate::extract::anchor::locate_sections;
use crate::extract::header::{extract_header, select_cover_sheet, HeaderRecord};
use crate::extract::lexicon::Lexicon;
use crate::extract::notes::{extract_notes, select_notes_sheet, NotesRecord};
use crate::extract::section::{walk_section, EventRecord};
use crate::spreadsheet::{CellGrid, ExtractionCriteria};
use log::debug;
use serde::Serialize;

/// Sheets each record set was read from.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Sources {
    pub event_sheets: Vec<String>,
    pub header_sheet: Option<String>,
    pub notes_sheet: Option<String>,
}

/// Everything extracted from one document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub document: String,
    /// Events in emission order: sheet, then section, then row
    pub events: Vec<EventRecord>,
    pub header: Option<HeaderRecord>,
    pub notes: Option<NotesRecord>,
    pub sources: Sources,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Events sorted by `(date, time)`, missing values first. Ties keep
    /// emission order.
    pub fn chronological_events(&self) -> Vec<&EventRecord> {
        let mut events: Vec<&EventRecord> = self.events.iter().collect();
        events.sort_by_key(|event| {
            (
                event.date.clone().unwrap_or_default(),
                event.time.clone().unwrap_or_default(),
            )
        });
        events
    }

    /// Nested map hand-off structure.
    pub fn to_json(&self) -> Result<serde_json::Value, ExtractError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, ExtractError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

/// Runs every extractor over a grid.
///
/// Extraction is a pure function of the grid: the extractor holds only
/// immutable configuration and can be shared between documents.
#[derive(Debug, Default)]
pub struct ReportExtractor {
    criteria: ExtractionCriteria,
    lexicon: Lexicon,
}

impl ReportExtractor {
    pub fn new(criteria: ExtractionCriteria, lexicon: Lexicon) -> Self {
        Self { criteria, lexicon }
    }

    /// Walks every timesheet section of every sheet, in workbook order.
    ///
    /// Returns the events and the names of the sheets that had sections.
    pub fn extract_events(&self, grid: &CellGrid) -> (Vec<EventRecord>, Vec<String>) {
        let mut events = Vec::new();
        let mut sheets = Vec::new();
        for sheet in grid.sheets() {
            let sections = locate_sections(sheet, self.lexicon.sections);
            debug!("sheet '{}': {} sections", sheet.name(), sections.len());
            if sections.is_empty() {
                continue;
            }
            for (index, section) in sections.iter().enumerate() {
                let walked = walk_section(sheet, section, index + 1, &self.lexicon);
                debug!(
                    "sheet '{}': section {} at {}{} has {} events",
                    sheet.name(),
                    index + 1,
                    section.event_column,
                    section.header_row,
                    walked.len()
                );
                events.extend(walked);
            }
            sheets.push(sheet.name().to_owned());
        }
        (events, sheets)
    }

    /// Extracts events, header and notes. Never fails: missing structure
    /// yields empty record sets and a diagnostic.
    pub fn extract(&self, grid: &CellGrid) -> Report {
        let mut diagnostics: Vec<Diagnostic> = grid
            .rejected()
            .iter()
            .map(|(sheet, reference)| Diagnostic::MalformedCoordinate {
                sheet: sheet.to_owned(),
                reference: reference.to_owned(),
            })
            .collect();
        let no_structure = |sheet: Option<&str>, record: &str| Diagnostic::NoStructureFound {
            sheet: sheet.map(str::to_owned),
            record: record.to_owned(),
        };

        let (events, event_sheets) = self.extract_events(grid);
        if events.is_empty() {
            diagnostics.push(no_structure(None, "events"));
        }

        let cover = select_cover_sheet(grid, &self.criteria, &self.lexicon);
        let header = cover.map(|sheet| extract_header(sheet, &self.criteria, &self.lexicon));
        if cover.is_none() {
            diagnostics.push(no_structure(None, "header"));
        }

        let notes_sheet = select_notes_sheet(grid, &self.lexicon);
        let notes = notes_sheet.map(|sheet| extract_notes(sheet, &self.criteria, &self.lexicon));
        match &notes {
            None => diagnostics.push(no_structure(None, "notes")),
            Some(notes) => {
                if notes.table_structure.is_none() {
                    diagnostics.push(no_structure(Some(notes.source_sheet.as_str()), "notes_structure"));
                }
                diagnostics.extend(notes.ambiguous_fields.iter().map(|(field, raw)| {
                    Diagnostic::AmbiguousNumericField {
                        sheet: notes.source_sheet.clone(),
                        field: field.to_owned(),
                        raw: raw.to_owned(),
                    }
                }));
            }
        }

        Report {
            document: grid.name().to_owned(),
            events,
            header,
            notes,
            sources: Sources {
                event_sheets,
                header_sheet: cover.map(|sheet| sheet.name().to_owned()),
                notes_sheet: notes_sheet.map(|sheet| sheet.name().to_owned()),
            },
            diagnostics,
        }
    }
}

/// Extracts a report with the built-in lexicon and default criteria.
pub fn extract_report(grid: &CellGrid) -> Report {
    ReportExtractor::default().extract(grid)
}
