// Primitives for reading the report CSV file.

use std::fs;

use log::debug;
use snafu::prelude::*;

use poll_tally::Row;

use crate::report::*;

/// Reads and tokenizes the whole report file. Rows of the report vary
/// in width, so the reader is flexible and keeps no header semantics.
pub fn read_report_rows(path: &str) -> ReportResult<Vec<Row>> {
    let meta = fs::metadata(path).context(OpeningReportSnafu { path })?;
    ensure!(meta.len() > 0, EmptyReportSnafu { path });

    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut rows: Vec<Row> = Vec::new();
    for (idx, record_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let record = record_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_report_rows: {:?} {:?}", lineno, record);
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    ensure!(!rows.is_empty(), EmptyReportSnafu { path });
    Ok(rows)
}
