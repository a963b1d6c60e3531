// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of the report, as tokenized by an external CSV parser.
///
/// Cells beyond the length of the row are treated as missing.
pub type Row = Vec<String>;

/// Options controlling how the report rows are interpreted.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ReportOptions {
    /// The first column holding poll content. Everything to the left is
    /// respondent metadata and is ignored.
    pub poll_res_start_col: usize,
}

impl ReportOptions {
    pub const DEFAULT: ReportOptions = ReportOptions {
        poll_res_start_col: 4,
    };
}

impl Default for ReportOptions {
    fn default() -> ReportOptions {
        ReportOptions::DEFAULT
    }
}

// ******** Output data structures *********

/// The tally of one poll question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollRecord {
    /// The question text. May be empty for Standard2021 response columns
    /// that had no matching header title.
    pub title: String,
    /// Count per answer label, in the order the labels were first seen.
    pub result: Vec<(String, u64)>,
    /// The number of response cells processed for this poll. A
    /// multi-select cell counts once here, regardless of how many
    /// answers it contains.
    pub num_response: u64,
    /// True as soon as one response cell held more than one
    /// semicolon-separated answer.
    pub multiple: bool,
}

impl PollRecord {
    pub fn new(title: String) -> PollRecord {
        PollRecord {
            title,
            result: Vec::new(),
            num_response: 0,
            multiple: false,
        }
    }
}

/// All the polls opened between one header row and the next.
pub type PollGroup = Vec<PollRecord>;

/// The two mutually exclusive row layouts of the report export.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReportFormat {
    /// One poll per data row: the row carries a (title, response) pair.
    /// The export does not list poll titles in the header row.
    Legacy2020,
    /// One row per respondent, one column per poll. All the poll titles
    /// appear in the header row.
    Standard2021,
}

impl ReportFormat {
    pub fn name(self) -> &'static str {
        match self {
            ReportFormat::Legacy2020 => "legacy2020",
            ReportFormat::Standard2021 => "standard2021",
        }
    }
}

/// The outcome of aggregating one report file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollReport {
    pub format: ReportFormat,
    pub groups: Vec<PollGroup>,
}

/// Errors that prevent the aggregation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// The input held no rows at all.
    EmptyInput,
    /// No header row was found anywhere in the input.
    MissingHeader,
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyInput => write!(f, "the report contains no rows"),
            TallyErrors::MissingHeader => {
                write!(f, "not a recognized poll export: no poll header row found")
            }
        }
    }
}
