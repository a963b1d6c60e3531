use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use poll_tally::{aggregate_rows, chart_table, ChartKind, PollReport, ReportOptions};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_csv;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening report file {path}"))]
    OpeningReport {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading report file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing row {lineno} of the report file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The report file {path} is empty"))]
    EmptyReport { path: String },
    #[snafu(display("Could not aggregate the poll report: {source}"))]
    Aggregation { source: poll_tally::TallyErrors },
    #[snafu(display("Error opening reference summary"))]
    OpeningJson { source: std::io::Error },
    #[snafu(display("Error handling the JSON summary"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub source: String,
    pub format: String,
    #[serde(rename = "numGroups")]
    pub num_groups: usize,
}

fn poll_groups_to_json(report: &PollReport) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for (idx, group) in report.groups.iter().enumerate() {
        let polls_js: Vec<JSValue> = group
            .iter()
            .map(|poll| {
                let table = chart_table(poll);
                let rows: Vec<JSValue> = table
                    .rows
                    .iter()
                    .map(|(label, count)| json!([label, count]))
                    .collect();
                let chart = match table.kind {
                    ChartKind::Bar => "bar",
                    ChartKind::Pie => "pie",
                };
                json!({
                    "title": table.title,
                    "chart": chart,
                    "multiple": poll.multiple,
                    "numResponse": poll.num_response,
                    "rows": rows,
                })
            })
            .collect();
        // The group ids start at 1 in the displayed output.
        l.push(json!({"group": idx + 1, "polls": polls_js}));
    }
    l
}

fn build_summary_js(source: &str, report: &PollReport) -> JSValue {
    let c = SummaryConfig {
        source: source.to_string(),
        format: report.format.name().to_string(),
        num_groups: report.groups.len(),
    };
    json!({
        "config": c,
        "results": poll_groups_to_json(report) })
}

pub fn read_summary(path: String) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let rows = io_csv::read_report_rows(&args.input)?;
    info!("run_report: read {} row(s) from {}", rows.len(), args.input);

    let options = match args.start_col {
        Some(col) => ReportOptions {
            poll_res_start_col: col,
        },
        None => ReportOptions::DEFAULT,
    };
    let report = aggregate_rows(&rows, &options).context(AggregationSnafu {})?;
    info!(
        "run_report: aggregated {} poll group(s) in format {}",
        report.groups.len(),
        report.format.name()
    );

    let summary = build_summary_js(&args.input, &report);
    let pretty_js_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_summary),
        Some(path) => fs::write(path, &pretty_js_summary).context(WritingSummarySnafu { path })?,
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between aggregated summary and reference summary");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_report(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn args_for(input: &str, out: Option<String>) -> Args {
        Args {
            input: input.to_string(),
            out,
            reference: None,
            start_col: None,
            verbose: false,
        }
    }

    #[test]
    fn empty_file_is_rejected() {
        let f = write_report("");
        let res = io_csv::read_report_rows(f.path().to_str().unwrap());
        assert!(matches!(res, Err(ReportError::EmptyReport { .. })));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let res = io_csv::read_report_rows("/nonexistent/report.csv");
        assert!(matches!(res, Err(ReportError::OpeningReport { .. })));
    }

    #[test]
    fn summary_shape_for_standard_report() {
        let f = write_report("#,,,,Q1,Q2\n,,,,yes,a;b\n,,,,no,a\n");
        let rows = io_csv::read_report_rows(f.path().to_str().unwrap()).unwrap();
        let report = aggregate_rows(&rows, &ReportOptions::DEFAULT).unwrap();
        let summary = build_summary_js("report.csv", &report);

        assert_eq!(summary["config"]["format"], "standard2021");
        assert_eq!(summary["config"]["numGroups"], 1);
        let polls = summary["results"][0]["polls"].as_array().unwrap();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0]["chart"], "pie");
        assert_eq!(polls[1]["chart"], "bar");
        assert_eq!(polls[1]["numResponse"], 2);
        assert_eq!(polls[1]["rows"], json!([["a", 2], ["b", 1]]));
    }

    #[test]
    fn run_report_writes_the_summary_file() {
        let f = write_report("#,,,,\n,,,,Q1,red\n,,,,Q1,blue\n,,,,Q2,x\n");
        let out = tempfile::NamedTempFile::new().unwrap();
        let args = args_for(
            f.path().to_str().unwrap(),
            Some(out.path().to_str().unwrap().to_string()),
        );
        run_report(&args).unwrap();

        let written = read_summary(out.path().to_str().unwrap().to_string()).unwrap();
        assert_eq!(written["config"]["format"], "legacy2020");
        let polls = written["results"][0]["polls"].as_array().unwrap();
        assert_eq!(polls[0]["title"], "Q1");
        assert_eq!(polls[1]["title"], "Q2");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let f = write_report("#,,,,Q1\n,,,,yes\n");
        let out = tempfile::NamedTempFile::new().unwrap();
        let reference = write_report("{\"results\": []}");
        let mut args = args_for(
            f.path().to_str().unwrap(),
            Some(out.path().to_str().unwrap().to_string()),
        );
        args.reference = Some(reference.path().to_str().unwrap().to_string());
        let res = run_report(&args);
        assert!(matches!(res, Err(ReportError::Whatever { .. })));
    }
}
