use crate::lb::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT: &str = "leaderboard.xlsx";
pub const DEFAULT_OUTPUT_DIR: &str = "Test2/output";

/// The optional JSON configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(rename = "inputFile")]
    pub input_file: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    pub reader: Option<String>,
    #[serde(rename = "nameColumn")]
    pub name_column: Option<String>,
}

/// The spreadsheet decoder to use.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReaderKind {
    /// calamine if available, the built-in decoder otherwise.
    Auto,
    Calamine,
    /// The built-in decoder.
    Xml,
}

impl ReaderKind {
    pub fn parse(name: &str) -> LbResult<ReaderKind> {
        match name.trim().to_lowercase().as_str() {
            "auto" => Ok(ReaderKind::Auto),
            "calamine" => Ok(ReaderKind::Calamine),
            "xml" => Ok(ReaderKind::Xml),
            _ => UnknownReaderSnafu { name }.fail(),
        }
    }
}

/// The options given on the command line. They take precedence over the
/// configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<String>,
    pub input: Option<String>,
    pub out: Option<String>,
    pub worksheet: Option<String>,
    pub reader: Option<String>,
    pub reference: Option<String>,
}

/// Everything needed for one run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub worksheet: Option<String>,
    pub reader: ReaderKind,
    pub name_column: Option<String>,
    pub reference: Option<PathBuf>,
}

pub fn read_config(path: &str) -> LbResult<LeaderboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    debug!("read_config: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })
}

/// Merges the command line, the configuration file and the defaults.
///
/// Relative paths found in the configuration file are relative to the
/// directory of that file.
pub fn build_settings(cli: &CliOverrides) -> LbResult<RunSettings> {
    let (config, root) = match &cli.config {
        Some(p) => {
            let config = read_config(p)?;
            info!("build_settings: config: {:?}", config);
            let root = Path::new(p)
                .parent()
                .map(|d| d.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (LeaderboardConfig::default(), PathBuf::new()),
    };

    let input = match (&cli.input, &config.input_file) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => PathBuf::from(DEFAULT_INPUT),
    };
    let out_dir = match (&cli.out, &config.output_directory) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => PathBuf::from(DEFAULT_OUTPUT_DIR),
    };
    let reader = match cli.reader.as_ref().or(config.reader.as_ref()) {
        Some(name) => ReaderKind::parse(name)?,
        None => ReaderKind::Auto,
    };

    Ok(RunSettings {
        input,
        out_dir,
        worksheet: cli.worksheet.clone().or(config.worksheet_name),
        reader,
        name_column: config.name_column,
        reference: cli.reference.as_ref().map(PathBuf::from),
    })
}
