mod chart;
mod model;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::chart::*;
pub use crate::model::*;

/// The marker carried by the first cell of a row that opens a poll group.
pub const HEADER_MARKER: &str = "#";

// **** Private structures ****

// The parsing mode. The detected format rides on the InGroup mode, so a
// format chosen at the first header row can never flip afterwards.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum ParseMode {
    Seeking,
    InGroup(ReportFormat),
}

// All the mutable state of one parse run. Created fresh for every call
// to aggregate_rows and discarded once the last group is flushed.
#[derive(Debug, Clone)]
struct ParseState {
    mode: ParseMode,
    current: Vec<PollRecord>,
    // Legacy2020 only: title -> index into `current`.
    title_index: HashMap<String, usize>,
    // Whether the current group's titles came from a titled header row.
    // Lazily discovered titles leave the group open-ended.
    header_seeded: bool,
    groups: Vec<PollGroup>,
}

impl ParseState {
    fn fresh() -> ParseState {
        ParseState {
            mode: ParseMode::Seeking,
            current: Vec::new(),
            title_index: HashMap::new(),
            header_seeded: false,
            groups: Vec::new(),
        }
    }

    fn open_group(&mut self, titles: &[String]) {
        self.current = titles
            .iter()
            .map(|t| PollRecord::new(t.clone()))
            .collect();
        self.title_index = titles
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.clone(), idx))
            .collect();
        self.header_seeded = !titles.is_empty();
    }

    // Flushes the current group. Empty groups are dropped, not appended.
    fn close_group(&mut self) {
        let polls = std::mem::take(&mut self.current);
        self.title_index.clear();
        self.header_seeded = false;
        if !polls.is_empty() {
            self.groups.push(polls);
        }
    }
}

/// A row opens a new poll group iff its first cell is the header marker.
fn is_header_row(row: &[String]) -> bool {
    row.first().map(|c| c.as_str()) == Some(HEADER_MARKER)
}

// The poll titles named by a header row: cells read rightward from the
// start column until the first empty or missing cell.
fn header_titles(row: &[String], start_col: usize) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    let mut col = start_col;
    while let Some(cell) = row.get(col) {
        if cell.is_empty() {
            break;
        }
        titles.push(cell.clone());
        col += 1;
    }
    titles
}

// Tallies one response cell into a poll record. The cell is split on
// ';'; each part bumps its label count, and the cell as a whole counts
// as a single response.
fn tally_cell(poll: &mut PollRecord, cell: &str) {
    let answers: Vec<&str> = cell.split(';').collect();
    if answers.len() > 1 {
        poll.multiple = true;
    }
    for answer in answers {
        bump(&mut poll.result, answer);
    }
    poll.num_response += 1;
}

fn bump(result: &mut Vec<(String, u64)>, label: &str) {
    if let Some(entry) = result.iter_mut().find(|(l, _)| l == label) {
        entry.1 += 1;
    } else {
        result.push((label.to_string(), 1));
    }
}

// Standard2021: one row per respondent, column start_col + i holding
// the response to poll i. Empty cells are skipped entirely. A response
// column beyond the header titles lazily creates an untitled record.
fn process_standard_row(state: &mut ParseState, row: &[String], start_col: usize) {
    for col in start_col..row.len() {
        let cell = &row[col];
        if cell.is_empty() {
            continue;
        }
        let poll_id = col - start_col;
        while state.current.len() <= poll_id {
            state.current.push(PollRecord::new(String::new()));
        }
        tally_cell(&mut state.current[poll_id], cell);
    }
}

// Legacy2020: one (title, response) pair per data row. Unseen titles
// register a fresh record; repeats reuse it. When the group's titles
// were fixed by a titled header row, a title that matches none of them
// implicitly closes the group first.
fn process_legacy_row(state: &mut ParseState, row: &[String], start_col: usize) {
    let title = match row.get(start_col) {
        Some(t) if !t.is_empty() => t,
        _ => return,
    };
    if state.header_seeded && !state.title_index.contains_key(title) && !state.current.is_empty() {
        debug!(
            "process_legacy_row: implicit group boundary before title {:?}",
            title
        );
        state.close_group();
    }
    let poll_id = match state.title_index.get(title) {
        Some(idx) => *idx,
        None => {
            state.current.push(PollRecord::new(title.clone()));
            let idx = state.current.len() - 1;
            state.title_index.insert(title.clone(), idx);
            idx
        }
    };
    match row.get(start_col + 1) {
        Some(cell) if !cell.is_empty() => tally_cell(&mut state.current[poll_id], cell),
        // An empty or missing response cell contributes to neither the
        // tally nor the response count.
        _ => {}
    }
}

/// Aggregates the tokenized rows of one report file into poll groups.
///
/// The rows are consumed in order by a two-mode state machine: the
/// parser seeks the first header row, detects the export format from
/// it, and then accumulates one group per header row. Groups are
/// returned in header order; polls within a group in the order their
/// titles were registered.
///
/// Fails with [TallyErrors::EmptyInput] when there are no rows at all,
/// and with [TallyErrors::MissingHeader] when no header row is found.
pub fn aggregate_rows(rows: &[Row], options: &ReportOptions) -> Result<PollReport, TallyErrors> {
    if rows.is_empty() {
        return Err(TallyErrors::EmptyInput);
    }
    let start_col = options.poll_res_start_col;
    let mut state = ParseState::fresh();
    for row in rows.iter() {
        debug!("aggregate_rows: mode: {:?} row: {:?}", state.mode, row);
        match state.mode {
            ParseMode::Seeking => {
                if is_header_row(row) {
                    let titles = header_titles(row, start_col);
                    let format = if titles.is_empty() {
                        ReportFormat::Legacy2020
                    } else {
                        ReportFormat::Standard2021
                    };
                    info!(
                        "aggregate_rows: detected format {:?} from header titles {:?}",
                        format, titles
                    );
                    state.open_group(&titles);
                    state.mode = ParseMode::InGroup(format);
                }
            }
            ParseMode::InGroup(format) => {
                if is_header_row(row) {
                    state.close_group();
                    let titles = header_titles(row, start_col);
                    state.open_group(&titles);
                } else {
                    match format {
                        ReportFormat::Standard2021 => {
                            process_standard_row(&mut state, row, start_col)
                        }
                        ReportFormat::Legacy2020 => process_legacy_row(&mut state, row, start_col),
                    }
                }
            }
        }
    }
    match state.mode {
        ParseMode::Seeking => Err(TallyErrors::MissingHeader),
        ParseMode::InGroup(format) => {
            state.close_group();
            info!(
                "aggregate_rows: {} group(s) aggregated in format {:?}",
                state.groups.len(),
                format
            );
            Ok(PollReport {
                format,
                groups: state.groups,
            })
        }
    }
}
