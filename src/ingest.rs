// 📥 Ingestion helper - raw CSV extracts → store tables
// Each CSV becomes a table named after the file; cell types are inferred.

use crate::writer::{ensure_identifier, WriteMode};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of ingesting one file
#[derive(Debug, Clone, Serialize)]
pub struct IngestedTable {
    pub table: String,
    pub source: PathBuf,
    pub rows: usize,
    pub elapsed_ms: i64,
}

/// Storage class picked for a whole CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

fn parse_real(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Narrowest kind every non-empty cell fits: INTEGER, then REAL, else TEXT.
/// A column with no values at all is TEXT.
pub fn infer_column_kind<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let mut kind = None;

    for cell in cells.into_iter().map(str::trim).filter(|c| !c.is_empty()) {
        let cell_kind = if cell.parse::<i64>().is_ok() {
            ColumnKind::Integer
        } else if parse_real(cell).is_some() {
            ColumnKind::Real
        } else {
            return ColumnKind::Text;
        };

        kind = match (kind, cell_kind) {
            (Some(ColumnKind::Real), _) | (_, ColumnKind::Real) => Some(ColumnKind::Real),
            _ => Some(ColumnKind::Integer),
        };
    }

    kind.unwrap_or(ColumnKind::Text)
}

/// Convert a cell for a column of `kind`; empty cells are NULL
pub fn convert_cell(cell: &str, kind: ColumnKind) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    match kind {
        ColumnKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(cell.to_string())),
        ColumnKind::Real => parse_real(trimmed)
            .map(Value::Real)
            .unwrap_or_else(|| Value::Text(cell.to_string())),
        ColumnKind::Text => Value::Text(cell.to_string()),
    }
}

fn quote_column(name: &str) -> String {
    format!("\"{}\"", name.trim().replace('"', "\"\""))
}

/// Load a headered CSV file into `table`. Returns the number of rows inserted.
///
/// The file is read in full first so each column gets one storage class.
pub fn ingest_csv(conn: &mut Connection, path: &Path, table: &str, mode: WriteMode) -> Result<usize> {
    ensure_identifier(table)?;

    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read headers of {}", path.display()))?
        .clone();
    if headers.is_empty() {
        bail!("CSV file {} has no header row", path.display());
    }

    let records = rdr
        .records()
        .enumerate()
        .map(|(line, result)| {
            result.with_context(|| format!("Failed to parse {} at line {}", path.display(), line + 2))
        })
        .collect::<Result<Vec<_>>>()?;

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col| infer_column_kind(records.iter().map(|r| r.get(col).unwrap_or(""))))
        .collect();
    debug!(table = %table, kinds = ?kinds, "Inferred column types");

    let columns: Vec<String> = headers.iter().map(quote_column).collect();

    let tx = conn.transaction()?;

    if mode == WriteMode::Replace {
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
    }
    tx.execute(
        &format!("CREATE TABLE IF NOT EXISTS {} ({})", table, columns.join(", ")),
        [],
    )
    .with_context(|| format!("Failed to create table {}", table))?;

    {
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ))?;

        for (line, record) in records.iter().enumerate() {
            let values = record.iter().zip(&kinds).map(|(cell, kind)| convert_cell(cell, *kind));
            stmt.execute(params_from_iter(values))
                .with_context(|| format!("Failed to insert line {} into {}", line + 2, table))?;
        }
    }

    tx.commit()?;

    Ok(records.len())
}

/// Ingest every `*.csv` file in `dir` (sorted by name), replacing the
/// table named after each file stem.
pub fn ingest_dir(conn: &mut Connection, dir: &Path) -> Result<Vec<IngestedTable>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut ingested = Vec::with_capacity(files.len());

    for path in files {
        let table = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => bail!("Unusable file name {}", path.display()),
        };

        debug!(table = %table, source = %path.display(), "Ingesting CSV");
        let started = Utc::now();
        let rows = ingest_csv(conn, &path, &table, WriteMode::Replace)?;
        let elapsed_ms = (Utc::now() - started).num_milliseconds();

        info!(table = %table, rows, elapsed_ms, "Ingested table");
        ingested.push(IngestedTable {
            table,
            source: path,
            rows,
            elapsed_ms,
        });
    }

    Ok(ingested)
}
