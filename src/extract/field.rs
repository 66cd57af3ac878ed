//! Labeled field lookup.
//!
//! Two strategies resolve a free-standing field:
//!
//! - **inline**: a cell containing `Label: value`
//! - **adjacency**: a cell holding exactly `Label`, with the value in a
//!   neighbouring cell found by an ordered chain of [`Probe`]s
//!
//! Tabular fields (pumping data) are read from a bounded [`TableWindow`] where
//! each label has its value one row below. Every strategy returns `None` on a
//! miss so the chains can be inspected and tested step by step.

use crate::extract::lexicon::{FieldSpec, Lexicon};
use crate::spreadsheet::{CellValue, Coordinate, SheetGrid};
use log::{debug, trace};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+[.,]?\d*").expect("Hardcode regex pattern"));

static BARE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+[.,]?\d*$").expect("Hardcode regex pattern"));

/// Text fields keyed by field key; unresolved fields are `None`.
pub type FieldValues = BTreeMap<String, Option<String>>;

/// Value of a tabular field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// A neighbour of a label cell that may hold its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// Two columns right, only when the label sits in the label column
    LabelColumn,
    /// `n` columns right
    Right(i32),
    /// One row down
    Below,
}

/// Generic adjacency chain, tried after [`Probe::LabelColumn`].
pub const NEIGHBOR_PROBES: [Probe; 4] = [Probe::Right(1), Probe::Right(2), Probe::Right(3), Probe::Below];

impl Probe {
    /// Cell this probe inspects for a label at `label`, if it applies.
    pub fn target(&self, label: &Coordinate, label_column: &str) -> Option<Coordinate> {
        let target = match self {
            Self::LabelColumn if label.column() == label_column => label.adjacent(2, 0),
            Self::LabelColumn => return None,
            Self::Right(columns) => label.adjacent(*columns, 0),
            Self::Below => label.adjacent(0, 1),
        };
        target.ok()
    }
}

/// Case-insensitive label comparison that folds non-ASCII letters too.
fn same_label(text: &str, label: &str) -> bool {
    text.to_lowercase() == label.to_lowercase()
}

/// Resolves a set of fields over one sheet.
#[derive(Debug)]
pub struct FieldExtractor<'a> {
    fields: &'a [FieldSpec],
    /// Lowercased labels never accepted as a value
    known_labels: HashSet<String>,
    label_column: String,
    /// Only rows up to this one are searched for labels
    row_limit: Option<u32>,
}

impl<'a> FieldExtractor<'a> {
    /// Creates an extractor for `fields`. Every label and section header of
    /// the lexicon counts as a known label.
    pub fn new(fields: &'a [FieldSpec], lexicon: &Lexicon) -> Self {
        let field_labels = [lexicon.cover_fields, lexicon.timesheet_fields, lexicon.pumping_fields]
            .into_iter()
            .flatten()
            .flat_map(|field| field.labels.iter());
        let section_labels = lexicon
            .sections
            .iter()
            .flat_map(|pattern| pattern.event.iter().chain(pattern.date).chain(pattern.time));
        let known_labels = field_labels
            .chain(section_labels)
            .chain(fields.iter().flat_map(|field| field.labels.iter()))
            .map(|label| label.to_lowercase())
            .collect();
        Self {
            fields,
            known_labels,
            label_column: "B".to_owned(),
            row_limit: None,
        }
    }

    /// Restricts label search to rows `1..=rows`.
    pub fn with_row_limit(mut self, rows: u32) -> Self {
        self.row_limit = Some(rows);
        self
    }

    fn is_known_label(&self, text: &str) -> bool {
        self.known_labels.contains(&text.trim().to_lowercase())
    }

    /// Inline strategy: the text after the first colon of a cell containing `label:`.
    pub fn inline_value(&self, text: &str, label: &str) -> Option<String> {
        let needle = format!("{}:", label.to_lowercase());
        if !text.to_lowercase().contains(&needle) {
            return None;
        }
        let (_, value) = text.split_once(':')?;
        let value = value.trim();
        if value.chars().count() <= 1 || same_label(value, label) {
            return None;
        }
        Some(value.to_owned())
    }

    /// Adjacency strategy: the first probe target holding a usable value.
    pub fn adjacent_value(&self, sheet: &SheetGrid, coordinate: &Coordinate, label: &str) -> Option<String> {
        std::iter::once(Probe::LabelColumn)
            .chain(NEIGHBOR_PROBES)
            .find_map(|probe| {
                let target = probe.target(coordinate, &self.label_column)?;
                let value = sheet.get(&target).map(CellValue::to_trimmed)?;
                let usable = value.chars().count() > 1
                    && !same_label(&value, label)
                    && !self.is_known_label(&value);
                if !usable {
                    trace!("probe {probe:?} at {target} rejected '{value}'");
                }
                usable.then_some(value)
            })
    }

    /// Resolves every field, scanning label cells in row-major order. The
    /// first value found for a field wins.
    pub fn extract(&self, sheet: &SheetGrid) -> FieldValues {
        let mut values: FieldValues = self
            .fields
            .iter()
            .map(|field| (field.key.to_owned(), None))
            .collect();
        for (coordinate, text) in sheet.text_cells() {
            if self.row_limit.is_some_and(|limit| coordinate.row() > limit) {
                break;
            }
            let trimmed = text.trim();
            for field in self.fields {
                if values.get(field.key).is_some_and(Option::is_some) {
                    continue;
                }
                let found = field.labels.iter().find_map(|label| {
                    if same_label(trimmed, label) {
                        self.adjacent_value(sheet, coordinate, label)
                    } else {
                        self.inline_value(trimmed, label)
                    }
                });
                if let Some(value) = found {
                    debug!("sheet '{}': {} = '{value}' at {coordinate}", sheet.name(), field.key);
                    values.insert(field.key.to_owned(), Some(value));
                }
            }
        }
        values
    }
}

/// Bounded block of cells scanned for tabular labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableWindow {
    pub first_row: u32,
    pub last_row: u32,
    pub columns: Vec<String>,
}

impl TableWindow {
    /// Rows `anchor_row + 1 ..= anchor_row + rows`, clamped to the sheet's last data row.
    pub fn below(sheet: &SheetGrid, anchor_row: u32, rows: u32, columns: &[String]) -> Self {
        let last_row = anchor_row.saturating_add(rows);
        Self {
            first_row: anchor_row.saturating_add(1),
            last_row: sheet.row_upper_bound().map_or(last_row, |upper| last_row.min(upper)),
            columns: columns.to_vec(),
        }
    }

    /// Cells inside the window, row by row.
    pub fn cells<'s>(&'s self, sheet: &'s SheetGrid) -> impl Iterator<Item = (Coordinate, &'s CellValue)> + 's {
        (self.first_row..=self.last_row).flat_map(move |row| {
            self.columns.iter().filter_map(move |column| {
                let coordinate = Coordinate::new(column, row).ok()?;
                let value = sheet.get(&coordinate)?;
                Some((coordinate, value))
            })
        })
    }
}

/// Outcome of a tabular scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableScan {
    pub values: BTreeMap<String, Option<FieldValue>>,
    /// `(field key, raw text)` of numeric fields that kept their raw text
    pub ambiguous: Vec<(String, String)>,
}

/// First signed decimal number in `text`, with `,` read as decimal point.
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER_PATTERN
        .find(text)
        .and_then(|found| found.as_str().replace(',', ".").parse().ok())
}

/// Reads tabular fields: a cell containing a label has its value one row below.
pub fn scan_table(sheet: &SheetGrid, window: &TableWindow, fields: &[FieldSpec]) -> TableScan {
    let mut scan = TableScan {
        values: fields.iter().map(|field| (field.key.to_owned(), None)).collect(),
        ..TableScan::default()
    };
    for (coordinate, value) in window.cells(sheet) {
        let Some(text) = value.as_text() else {
            continue;
        };
        let text = text.to_lowercase();
        for field in fields {
            if scan.values.get(field.key).is_some_and(Option::is_some) {
                continue;
            }
            if !field.labels.iter().any(|label| text.contains(&label.to_lowercase())) {
                continue;
            }
            let Some(raw) = coordinate
                .adjacent(0, 1)
                .ok()
                .and_then(|below| sheet.get(&below))
                .map(CellValue::to_trimmed)
                .filter(|raw| !raw.is_empty())
            else {
                continue;
            };
            let value = if field.numeric {
                match first_number(&raw) {
                    Some(number) => FieldValue::Number(number),
                    None => {
                        scan.ambiguous.push((field.key.to_owned(), raw.clone()));
                        FieldValue::Text(raw)
                    }
                }
            } else {
                FieldValue::Text(raw)
            };
            scan.values.insert(field.key.to_owned(), Some(value));
        }
    }
    scan
}

/// A last-resort numeric guess: the first bare number accepted by `accepts`
/// fills `key` when it is still empty.
#[derive(Debug)]
pub struct NumericGuess {
    pub key: &'static str,
    pub accepts: fn(f64) -> bool,
}

fn small_negative(value: f64) -> bool {
    -50.0 < value && value < 0.0
}

fn large_negative(value: f64) -> bool {
    value < -100.0
}

/// Pumping time and rate guesses. These ranges are a heuristic of unknown
/// reliability and depend on cell order.
pub const PUMPING_GUESSES: &[NumericGuess] = &[
    NumericGuess {
        key: "pumping_time",
        accepts: small_negative,
    },
    NumericGuess {
        key: "pumping_rate",
        accepts: large_negative,
    },
];

/// Fills still-empty guess fields from bare numbers anywhere on the sheet.
///
/// Each number goes to the first guess whose range accepts it.
pub fn guess_numbers(sheet: &SheetGrid, values: &mut BTreeMap<String, Option<FieldValue>>, guesses: &[NumericGuess]) {
    let is_empty = |values: &BTreeMap<String, Option<FieldValue>>, key: &str| {
        values.get(key).is_none_or(Option::is_none)
    };
    if guesses.iter().all(|guess| !is_empty(values, guess.key)) {
        return;
    }
    for (coordinate, value) in sheet.cells() {
        let text = value.to_trimmed();
        if !BARE_NUMBER_PATTERN.is_match(&text) {
            continue;
        }
        let Ok(number) = text.replace(',', ".").parse::<f64>() else {
            continue;
        };
        if let Some(guess) = guesses.iter().find(|guess| (guess.accepts)(number)) {
            if is_empty(values, guess.key) {
                debug!("sheet '{}': guessed {} = {number} from {coordinate}", sheet.name(), guess.key);
                values.insert(guess.key.to_owned(), Some(FieldValue::Number(number)));
            }
        }
    }
}
