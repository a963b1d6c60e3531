use crate::model::PollRecord;

/// How a finished poll should be rendered by the charting layer.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    /// Multi-select polls: one bar per answer.
    Bar,
    /// Single-choice polls.
    Pie,
}

/// A chart-ready table for one poll: labels and counts, sorted by count.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartTable {
    pub title: String,
    pub kind: ChartKind,
    pub rows: Vec<(String, u64)>,
}

/// Converts a finished poll record into the table consumed by the
/// charting layer. Rows are sorted by count, descending; ties keep the
/// order in which the labels were first seen.
pub fn chart_table(poll: &PollRecord) -> ChartTable {
    let mut rows = poll.result.clone();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    let kind = if poll.multiple {
        ChartKind::Bar
    } else {
        ChartKind::Pie
    };
    ChartTable {
        title: poll.title.clone(),
        kind,
        rows,
    }
}
