use clap::Parser;

/// This program turns the export of a crowd-voting session into one PDF page per question.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The CSV export of the voting session. It must contain the columns
    /// 'Question Number', 'Vote Title' and 'Question Title'.
    #[clap(value_parser)]
    pub datafile: String,

    /// If passed as an argument, no chart is drawn: every page gets the same blank image and
    /// no PNG file is written.
    #[clap(long, takes_value = false)]
    pub nocharts: bool,

    /// If passed as an argument, charts are drawn even when the configuration file sets
    /// 'noCharts'.
    #[clap(long, takes_value = false, conflicts_with = "nocharts")]
    pub charts: bool,

    /// (number in [0, 1), default 0) The fraction of the lowest and of the highest votes that
    /// is discarded before computing the mean. Any non-zero value discards at least one vote
    /// on each side.
    #[clap(long, value_parser)]
    pub trim: Option<f64>,

    /// (file path, optional) A JSON file with the correct answer of each question, keyed by
    /// question number: {"1": {"q": "...", "a": "..."}}. If provided, the answer is displayed
    /// next to the crowd answer.
    #[clap(long, value_parser)]
    pub answers: Option<String>,

    /// (default box) The type of chart: 'box' or 'swarm'.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// (file path, optional) A TrueType font used for the text of the charts. Without it,
    /// charts are drawn without labels.
    #[clap(long, value_parser)]
    pub font: Option<String>,

    /// (file path, optional) A PNG image used instead of the charts with --nocharts.
    #[clap(long, value_parser)]
    pub placeholder: Option<String>,

    /// (directory, default current directory) Where the charts and the pages are written.
    #[clap(short, long, value_parser)]
    pub out_dir: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of all the questions will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the program checks that
    /// the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, optional) A JSON file with the settings of the report. Options passed on
    /// the command line take precedence.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
