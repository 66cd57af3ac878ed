use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use timesheet_extractor::extract::analysis::{analyze, EventAnalysis};
use timesheet_extractor::extract::lexicon::Lexicon;
use timesheet_extractor::extract::{Report, ReportExtractor};
use timesheet_extractor::spreadsheet::{CellGrid, ExtractionCriteria};

#[derive(Parser)]
#[command(about = "Extract timesheet events, report header and operational notes from a maritime report.")]
struct Args {
    /// Cell-map JSON file (`{"Sheet": {"A1": ...}}`) or spreadsheet file.
    input: PathBuf,

    /// Include an event analysis next to the report.
    #[arg(long)]
    analysis: bool,

    /// Print compact JSON instead of pretty-printed JSON.
    #[arg(long)]
    compact: bool,

    /// Rows searched for timesheet header fields.
    #[arg(long)]
    header_rows: Option<u32>,

    /// Rows below the notes anchor searched for weather marks.
    #[arg(long)]
    weather_rows: Option<u32>,

    /// Rows below the notes anchor searched for pumping data.
    #[arg(long)]
    pumping_rows: Option<u32>,

    /// Glob pattern naming the cover sheet (repeatable, case-insensitive).
    #[arg(long = "cover-sheet")]
    cover_sheets: Vec<String>,
}

#[derive(Serialize)]
struct Output<'a> {
    report: &'a Report,
    analysis: EventAnalysis,
}

fn criteria(args: &Args) -> Result<ExtractionCriteria> {
    let mut criteria = ExtractionCriteria::default();
    if let Some(rows) = args.header_rows {
        criteria.timesheet_header_rows = rows;
    }
    if let Some(rows) = args.weather_rows {
        criteria.weather_rows = rows;
    }
    if let Some(rows) = args.pumping_rows {
        criteria.pumping_rows = rows;
    }
    if !args.cover_sheets.is_empty() {
        criteria = criteria
            .with_cover_patterns(args.cover_sheets.as_slice())
            .context("Invalid --cover-sheet pattern")?;
    }
    Ok(criteria)
}

fn load(path: &Path) -> Result<CellGrid> {
    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let grid = if is_json {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        CellGrid::from_reader(&name, BufReader::new(file))
    } else {
        CellGrid::open(path)
    };
    grid.with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let grid = load(&args.input)?;
    let extractor = ReportExtractor::new(criteria(&args)?, Lexicon::default());
    let report = extractor.extract(&grid);

    let json = if args.analysis {
        let output = Output {
            report: &report,
            analysis: analyze(&report),
        };
        if args.compact {
            serde_json::to_string(&output)?
        } else {
            serde_json::to_string_pretty(&output)?
        }
    } else {
        report.to_json_string(!args.compact)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_default_criteria() {
        let args = Args::try_parse_from([
            "extract_report",
            "report.json",
            "--header-rows",
            "20",
            "--pumping-rows",
            "5",
            "--cover-sheet",
            "Front*",
        ])
        .unwrap();

        let criteria = criteria(&args).unwrap();
        assert_eq!(criteria.timesheet_header_rows, 20);
        assert_eq!(criteria.weather_rows, ExtractionCriteria::default().weather_rows);
        assert_eq!(criteria.pumping_rows, 5);
        assert!(criteria.is_cover_sheet("front page"));
        assert!(!criteria.is_cover_sheet("Cubierta"));
    }

    #[test]
    fn invalid_cover_pattern_is_an_error() {
        let args = Args::try_parse_from(["extract_report", "report.json", "--cover-sheet", "[a"]).unwrap();

        assert!(criteria(&args).is_err());
    }

    #[test]
    fn json_input_is_named_after_its_stem() {
        let path = std::env::temp_dir().join(format!("extract-report-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"TS": {"A1": "Event", "B1": "Date", "C1": "Time", "A2": "Pilot on board"}}"#)
            .unwrap();

        let grid = load(&path);
        std::fs::remove_file(&path).unwrap();
        let grid = grid.unwrap();
        assert_eq!(grid.name(), format!("extract-report-{}", std::process::id()));
        assert_eq!(extract_report_events(&grid), ["Pilot on board"]);
    }

    #[test]
    fn missing_input_mentions_the_path() {
        let error = load(Path::new("no-such-report.json")).unwrap_err();

        assert!(format!("{error:#}").contains("no-such-report.json"));
    }

    fn extract_report_events(grid: &CellGrid) -> Vec<String> {
        ReportExtractor::default()
            .extract(grid)
            .events
            .into_iter()
            .map(|event| event.description)
            .collect()
    }
}
