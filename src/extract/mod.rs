//! # Extraction Module
//!
//! Turns a [`CellGrid`](crate::spreadsheet::CellGrid) into structured records:
//!
//! - [`anchor`] finds timesheet header rows and derives section layouts
//! - [`section`] walks each section into [`EventRecord`]s
//! - [`classify`] assigns event categories and normalizes times
//! - [`field`] resolves labeled fields by inline, adjacency and tabular lookup
//! - [`header`] and [`notes`] build the cover and notes records
//! - [`report`] runs everything over a document; [`analysis`] summarizes it
//!
//! All label phrases and keywords live in [`lexicon`] as plain data.
pub mod analysis;
pub mod anchor;
pub mod classify;
pub mod field;
pub mod header;
pub mod lexicon;
pub mod notes;
pub mod report;
pub mod section;

pub use analysis::{analyze, EventAnalysis};
pub use anchor::{locate_anchors, locate_sections, Anchor, SectionDescriptor};
pub use classify::{classify, format_time, Category};
pub use field::{FieldExtractor, FieldValue, FieldValues};
pub use header::HeaderRecord;
pub use lexicon::{Lexicon, Variant};
pub use notes::{NotesRecord, StructureDescriptor};
pub use report::{extract_report, Report, ReportExtractor, Sources};
pub use section::{format_date, walk_section, EventRecord};
