use crate::extract::classify::Category;
use crate::extract::report::Report;
use crate::extract::section::EventRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DateRange {
    /// Smallest date text in lexical order
    pub first: Option<String>,
    /// Largest date text in lexical order
    pub last: Option<String>,
    pub distinct_dates: usize,
    pub dated_events: usize,
    /// Days between the earliest and latest parseable dates
    pub span_days: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Summary statistics over a report's events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventAnalysis {
    pub document: String,
    pub total_events: usize,
    pub events_per_sheet: BTreeMap<String, usize>,
    pub date_range: DateRange,
    /// Non-empty categories in classification priority order
    pub categories: Vec<CategoryCount>,
    pub first_event: Option<EventRecord>,
    pub last_event: Option<EventRecord>,
}

/// Parses a date written in one of the common report layouts.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

fn date_range(events: &[EventRecord]) -> DateRange {
    let dates: Vec<&str> = events
        .iter()
        .filter_map(|event| event.date.as_deref())
        .filter(|date| !date.is_empty())
        .collect();
    let distinct: BTreeSet<&str> = dates.iter().copied().collect();
    let parsed: Vec<NaiveDate> = distinct.iter().filter_map(|date| parse_date(date)).collect();
    let span_days = parsed
        .iter()
        .min()
        .zip(parsed.iter().max())
        .map(|(first, last)| (*last - *first).num_days());
    DateRange {
        first: distinct.first().map(|date| date.to_string()),
        last: distinct.last().map(|date| date.to_string()),
        distinct_dates: distinct.len(),
        dated_events: dates.len(),
        span_days,
    }
}

/// Summarizes a report's events.
pub fn analyze(report: &Report) -> EventAnalysis {
    let mut events_per_sheet = BTreeMap::new();
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for event in &report.events {
        *events_per_sheet.entry(event.sheet_name.clone()).or_insert(0) += 1;
        *counts.entry(event.category).or_insert(0) += 1;
    }
    let chronological = report.chronological_events();

    EventAnalysis {
        document: report.document.clone(),
        total_events: report.events.len(),
        events_per_sheet,
        date_range: date_range(&report.events),
        categories: counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
        first_event: chronological.first().map(|event| (*event).clone()),
        last_event: chronological.last().map(|event| (*event).clone()),
    }
}
