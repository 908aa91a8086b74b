use log::{debug, info, warn};

use ranked_leaderboard::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod extract;
mod io_common;
mod io_output;
#[cfg(feature = "calamine")]
mod io_xlsx;
mod io_xml;

use crate::lb::config_reader::*;
use crate::lb::extract::*;
use crate::lb::io_output::*;

/// The content of a spreadsheet cell, as seen by the extractor.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

/// The rows of a worksheet. Rows may have different lengths.
pub type CellGrid = Vec<Vec<Cell>>;

/// The error reported by calamine.
#[cfg(feature = "calamine")]
pub type ExcelError = calamine::XlsxError;
#[cfg(not(feature = "calamine"))]
pub type ExcelError = std::convert::Infallible;

#[derive(Debug, Snafu)]
pub enum LbError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: ExcelError,
        path: String,
    },
    #[snafu(display("{path} is not a valid xlsx container"))]
    OpeningArchive {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("Error reading {entry} in the spreadsheet"))]
    ReadingArchive {
        source: zip::result::ZipError,
        entry: String,
    },
    #[snafu(display("Error reading {entry} in the spreadsheet"))]
    ReadingArchiveEntry {
        source: std::io::Error,
        entry: String,
    },
    #[snafu(display("The spreadsheet has no {entry}"))]
    MissingArchiveEntry { entry: String },
    #[snafu(display("Malformed XML in {entry}"))]
    ParsingXml {
        source: quick_xml::Error,
        entry: String,
    },
    #[snafu(display("Worksheet {name:?} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("The worksheet has no header row"))]
    MissingHeaderRow {},
    #[snafu(display("No player name column among the headers: {headers}"))]
    MissingNameColumn { headers: String },
    #[snafu(display("The {reader} reader is not available in this build"))]
    ReaderUnavailable { reader: String },

    #[snafu(display("Error opening configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Unknown reader {name:?} (expected auto, calamine or xml)"))]
    UnknownReader { name: String },

    #[snafu(display("Could not create the output directory {path}"))]
    CreatingOutputDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the leaderboard to JSON"))]
    WritingJson { source: serde_json::Error },

    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing reference file {path}"))]
    ParsingReference {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the leaderboard and the reference {path}"))]
    ReferenceMismatch { path: String },
}

pub type LbResult<T> = Result<T, LbError>;

#[cfg(feature = "calamine")]
fn read_with_calamine(path: &Path, worksheet: Option<&str>) -> LbResult<CellGrid> {
    io_xlsx::read_calamine_grid(path, worksheet)
}

#[cfg(not(feature = "calamine"))]
fn read_with_calamine(_path: &Path, _worksheet: Option<&str>) -> LbResult<CellGrid> {
    ReaderUnavailableSnafu { reader: "calamine" }.fail()
}

/// Reads the cells of one worksheet.
///
/// In automatic mode, calamine is tried first (when compiled in) and the
/// built-in decoder takes over if it fails.
pub fn read_grid(path: &Path, reader: ReaderKind, worksheet: Option<&str>) -> LbResult<CellGrid> {
    info!("read_grid: reading {:?} with reader {:?}", path, reader);
    match reader {
        ReaderKind::Xml => io_xml::read_xlsx_grid(path, worksheet),
        ReaderKind::Calamine => read_with_calamine(path, worksheet),
        ReaderKind::Auto => {
            if cfg!(feature = "calamine") {
                match read_with_calamine(path, worksheet) {
                    Ok(grid) => return Ok(grid),
                    Err(e) => warn!(
                        "read_grid: calamine could not read {:?} ({}), using the built-in reader",
                        path, e
                    ),
                }
            }
            io_xml::read_xlsx_grid(path, worksheet)
        }
    }
}

fn check_reference(reference: &Path, produced_path: &Path) -> LbResult<()> {
    let ref_display = reference.display().to_string();
    let contents = fs::read_to_string(reference).context(OpeningReferenceSnafu {
        path: ref_display.clone(),
    })?;
    let summary_ref: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingReferenceSnafu {
            path: ref_display.clone(),
        })?;
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;

    let produced = fs::read_to_string(produced_path).context(OpeningReferenceSnafu {
        path: produced_path.display().to_string(),
    })?;
    let produced = produced.trim_end();
    if pretty_ref != produced {
        warn!("Found differences with the reference {:?}", reference);
        print_diff(pretty_ref.as_str(), produced, "\n");
        return ReferenceMismatchSnafu { path: ref_display }.fail();
    }
    info!("check_reference: output matches {:?}", reference);
    Ok(())
}

/// Runs the whole pipeline: read the spreadsheet, rank the players, write
/// the CSV and JSON files.
///
/// Nothing is written if the spreadsheet cannot be read or has no usable
/// header.
pub fn run_leaderboard(settings: &RunSettings) -> LbResult<(PathBuf, PathBuf)> {
    info!("run_leaderboard: settings: {:?}", settings);
    let grid = read_grid(
        &settings.input,
        settings.reader,
        settings.worksheet.as_deref(),
    )?;
    debug!("run_leaderboard: read {:?} rows", grid.len());

    let classifier = HeaderPatterns::new(settings.name_column.clone());
    let board = extract_players(&grid, &classifier)?;
    info!(
        "run_leaderboard: {:?} players, round columns: {:?}",
        board.players.len(),
        board.round_labels
    );

    let ranked = rank_players(&board.players);

    let (csv_path, json_path) = write_outputs(&settings.out_dir, &board.round_labels, &ranked)?;

    if let Some(reference) = &settings.reference {
        check_reference(reference, &json_path)?;
    }
    Ok((csv_path, json_path))
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#;

    pub const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    pub const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Results" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

    pub const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#;

    pub fn shared_strings_xml(strings: &[&str]) -> String {
        let items: String = strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{n}" uniqueCount="{n}">{items}</sst>"#,
            n = strings.len(),
            items = items
        )
    }

    pub fn sheet_xml(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    /// Writes a zip archive with the given entries.
    pub fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    /// Writes a complete workbook with a single sheet named `Results`.
    pub fn write_workbook(path: &Path, strings: &[&str], rows: &str) {
        let shared = shared_strings_xml(strings);
        let sheet = sheet_xml(rows);
        write_archive(
            path,
            &[
                ("[Content_Types].xml", CONTENT_TYPES),
                ("_rels/.rels", ROOT_RELS),
                ("xl/workbook.xml", WORKBOOK),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/sharedStrings.xml", shared.as_str()),
                ("xl/worksheets/sheet1.xml", sheet.as_str()),
            ],
        );
    }
}
