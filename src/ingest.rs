//! Ingestion pipeline orchestration.
//!
//! Coordinates the full build: discovery → spreadsheet reading → hierarchy.
//! A file that cannot be read is logged and skipped; the remaining files
//! still contribute. The build never fails as a whole: in the worst case the
//! result is an empty schedule.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::connector_fs;
use crate::hierarchy::ScheduleBuilder;
use crate::models::Schedule;
use crate::spreadsheet;

/// A file that was discovered but contributed no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

/// Counters collected while building a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files_found: usize,
    pub files_read: usize,
    pub files_failed: Vec<FileFailure>,
    /// Data rows handed to the builder.
    pub rows_read: usize,
    /// Rows dropped by normalization (blank day or topic, no week number).
    pub rows_skipped: usize,
    pub weeks: usize,
}

/// Builds the schedule from every configured spreadsheet.
pub fn build_schedule(config: &Config) -> (Schedule, IngestReport) {
    let mut report = IngestReport::default();

    let files = match connector_fs::scan_data_dir(&config.data) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("file discovery failed: {:#}", e);
            return (Schedule::default(), report);
        }
    };
    report.files_found = files.len();
    if files.is_empty() {
        tracing::warn!(
            "no spreadsheets found under {}",
            config.data.root.display()
        );
    }

    let mut builder = ScheduleBuilder::new();
    for file in &files {
        let sheet = match spreadsheet::read_rows(&file.path, &config.columns) {
            Ok(sheet) => sheet,
            Err(e) => {
                tracing::warn!("skipping {}: {}", file.relative, e);
                report.files_failed.push(FileFailure {
                    path: file.relative.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !sheet.missing_columns.is_empty() {
            tracing::warn!(
                "{} is missing column(s): {}",
                file.relative,
                sheet.missing_columns.join(", ")
            );
        }

        let skipped_before = builder.rows_skipped();
        builder.extend(&sheet.rows);
        tracing::debug!(
            "{}: {} rows, {} skipped",
            file.relative,
            sheet.rows.len(),
            builder.rows_skipped() - skipped_before
        );

        report.files_read += 1;
        report.rows_read += sheet.rows.len();
    }

    report.rows_skipped = builder.rows_skipped();
    let schedule = builder.finish();
    report.weeks = schedule.len();

    tracing::info!(
        "built schedule: {} weeks, {} lessons from {} of {} files",
        report.weeks,
        schedule.lesson_count(),
        report.files_read,
        report.files_found
    );

    (schedule, report)
}

/// CLI entry for `cronograma build`.
///
/// Prints the ingest summary, or with `json` the same body
/// `GET /api/cronograma` serves.
pub fn run_build(config: &Config, json: bool) -> Result<()> {
    let (schedule, report) = build_schedule(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!("build {}", config.data.root.display());
    println!("  files found: {}", report.files_found);
    println!("  files read: {}", report.files_read);
    for failure in &report.files_failed {
        println!("  failed: {} ({})", failure.path, failure.reason);
    }
    println!("  rows read: {}", report.rows_read);
    println!("  rows skipped: {}", report.rows_skipped);
    println!("  weeks: {}", report.weeks);
    println!("  lessons: {}", schedule.lesson_count());
    println!("ok");

    Ok(())
}
