use clap::Parser;

/// This program turns a spreadsheet of competition results into a ranked leaderboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default leaderboard.xlsx) The Excel (.xlsx) file containing the results.
    /// The first row holds the headers, every other row is a player.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (directory, default Test2/output) Where leaderboard_normalized.csv and
    /// leaderboard_normalized.json are written. The directory is created if needed.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) A JSON configuration file. The options given on the command line
    /// take precedence over the ones in this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A reference leaderboard in JSON format. If provided, lbnorm will
    /// check that the JSON output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default: the first worksheet) The name of the worksheet to use.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (auto, calamine or xml; default auto) The spreadsheet decoder. 'xml' uses the
    /// built-in decoder, which does not depend on calamine.
    #[clap(long, value_parser)]
    pub reader: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
