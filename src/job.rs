// 🚚 Vendor summary job - Builder → Enricher → Writer
// Single pass, single connection, no retries. Re-run from scratch on failure.

use crate::cleaning::clean_data;
use crate::config::AppConfig;
use crate::summary::create_vendor_summary;
use crate::writer::{write_summary, WriteMode};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, Dispatch};

/// Rows shown in the debug preview after each phase
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct JobOptions {
    pub destination: String,
    pub mode: WriteMode,
}

impl From<&AppConfig> for JobOptions {
    fn from(config: &AppConfig) -> Self {
        JobOptions {
            destination: config.destination_table.clone(),
            mode: config.write_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub destination: String,
    pub rows_written: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows written to {} in {} ms",
            self.rows_written,
            self.destination,
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}

fn preview<T: Debug>(rows: &[T]) -> String {
    rows.iter()
        .take(PREVIEW_ROWS)
        .map(|row| format!("{:?}", row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the job with `dispatch` as the scoped log handle
pub fn run_job(conn: &mut Connection, options: &JobOptions, dispatch: &Dispatch) -> Result<RunReport> {
    tracing::dispatcher::with_default(dispatch, || run_phases(conn, options))
}

fn run_phases(conn: &mut Connection, options: &JobOptions) -> Result<RunReport> {
    let started_at = Utc::now();

    info!("....Creating Vendor Summary Table....");
    let summary = create_vendor_summary(conn)?;
    debug!(rows = summary.len(), "vendor summary built\n{}", preview(&summary));

    info!("....Cleaning Data....");
    let cleaned = clean_data(summary)?;
    debug!(rows = cleaned.len(), "vendor summary cleaned\n{}", preview(&cleaned));

    info!(destination = %options.destination, mode = ?options.mode, "....Ingesting Data....");
    let rows_written = write_summary(conn, &cleaned, &options.destination, options.mode)?;

    let report = RunReport {
        destination: options.destination.clone(),
        rows_written,
        started_at,
        finished_at: Utc::now(),
    };
    info!(rows = rows_written, "Completed: {}", report.summary());

    Ok(report)
}
