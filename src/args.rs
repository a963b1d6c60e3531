use clap::Parser;

/// This program aggregates a meeting poll report into chart-ready tallies.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The CSV poll report exported from the meeting platform.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path, 'stdout' or empty) If specified, the summary of the polls will be written in
    /// JSON format to the given location. By default the summary is written to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a poll summary in JSON format. If provided, pollviz
    /// will check that the aggregated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 4) The first column of the report holding poll content. The columns to the left
    /// are respondent metadata and are ignored.
    #[clap(long, value_parser)]
    pub start_col: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
