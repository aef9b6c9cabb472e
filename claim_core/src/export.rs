//! CSV export of analysis results.
//!
//! One row per condition with data. List fields are joined with `" | "` so
//! the file stays one record per line in spreadsheet tools.

use crate::analysis::AnalysisResult;
use crate::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const LIST_SEPARATOR: &str = " | ";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    code: &'a str,
    condition: &'a str,
    system: &'a str,
    rating: String,
    table: &'a str,
    evidence: String,
    gaps: String,
}

/// Write rows for every result with data; returns the row count.
pub fn write_csv<W: Write>(writer: W, results: &[AnalysisResult<'_>]) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for analysis in results.iter().filter_map(|r| r.analysis.as_ref()) {
        csv.serialize(CsvRow {
            code: analysis.diagnostic_code,
            condition: analysis.condition,
            system: analysis.body_system.label(),
            rating: analysis.supported_rating.to_string(),
            table: analysis.governing_table,
            evidence: analysis.evidence.join(LIST_SEPARATOR),
            gaps: analysis.gaps.join(LIST_SEPARATOR),
        })?;
        rows += 1;
    }
    if rows == 0 {
        csv.write_record(["code", "condition", "system", "rating", "table", "evidence", "gaps"])?;
    }
    csv.flush()?;
    Ok(rows)
}

/// Write the export to `path`, creating parent directories.
pub fn export_csv(path: &Path, results: &[AnalysisResult<'_>]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_csv(std::io::BufWriter::new(file), results)?;
    tracing::info!("Exported {} conditions to {:?}", rows, path);
    Ok(rows)
}
