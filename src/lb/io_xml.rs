// Built-in xlsx decoder: the zip container is opened directly and the shared
// strings and worksheet XML are decoded with quick-xml.

use std::fs::File;
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::lb::io_common::column_index;
use crate::lb::*;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";

pub fn read_xlsx_grid(path: &Path, worksheet: Option<&str>) -> LbResult<CellGrid> {
    let path_s = path.display().to_string();
    let file = File::open(path).context(OpeningFileSnafu {
        path: path_s.clone(),
    })?;
    let mut archive = ZipArchive::new(file).context(OpeningArchiveSnafu { path: path_s })?;

    let shared = match read_entry(&mut archive, SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml).context(ParsingXmlSnafu {
            entry: SHARED_STRINGS,
        })?,
        None => Vec::new(),
    };
    debug!("read_xlsx_grid: {:?} shared strings", shared.len());

    let sheet_path = find_sheet_path(&mut archive, worksheet)?;
    debug!("read_xlsx_grid: reading sheet {:?}", sheet_path);
    let sheet_xml = read_entry(&mut archive, &sheet_path)?.context(MissingArchiveEntrySnafu {
        entry: sheet_path.clone(),
    })?;
    parse_sheet(&sheet_xml, &shared).context(ParsingXmlSnafu { entry: sheet_path })
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> LbResult<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).context(ReadingArchiveSnafu { entry: name }),
    };
    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .context(ReadingArchiveEntrySnafu { entry: name })?;
    Ok(Some(contents))
}

/// Finds the path of the worksheet inside the archive, through the workbook
/// and its relationships. Without a name, the first sheet of the workbook is
/// used.
fn find_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    worksheet: Option<&str>,
) -> LbResult<String> {
    let workbook = read_entry(archive, WORKBOOK)?;
    let rels = read_entry(archive, WORKBOOK_RELS)?;
    let (workbook, rels) = match (workbook, rels) {
        (Some(w), Some(r)) => (w, r),
        _ => {
            if let Some(name) = worksheet {
                return MissingWorksheetSnafu { name }.fail();
            }
            return Ok(DEFAULT_SHEET.to_string());
        }
    };
    let sheets = parse_workbook_sheets(&workbook).context(ParsingXmlSnafu { entry: WORKBOOK })?;
    let relationships = parse_relationships(&rels).context(ParsingXmlSnafu {
        entry: WORKBOOK_RELS,
    })?;
    debug!("find_sheet_path: sheets: {:?}", sheets);

    let sheet = match worksheet {
        Some(name) => sheets
            .iter()
            .find(|(n, _)| n == name)
            .context(MissingWorksheetSnafu { name })?,
        None => match sheets.first() {
            Some(s) => s,
            None => return Ok(DEFAULT_SHEET.to_string()),
        },
    };
    let target = relationships
        .iter()
        .find(|(id, _)| *id == sheet.1)
        .map(|(_, target)| resolve_target(target));
    Ok(target.unwrap_or_else(|| DEFAULT_SHEET.to_string()))
}

// Relationship targets are relative to xl/, unless they are absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// The (name, relationship id) of every sheet, in workbook order.
pub fn parse_workbook_sheets(xml: &str) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    let mut res: Vec<(String, String)> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(id)) = (attr_value(&e, b"name"), attr_value(&e, b"id")) {
                    res.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(res)
}

/// The (id, target) of every relationship.
pub fn parse_relationships(xml: &str) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    let mut res: Vec<(String, String)> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target"))
                {
                    res.push((id, target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(res)
}

/// The shared-string table. Rich-text runs of an item are concatenated;
/// phonetic hints are dropped.
pub fn parse_shared_strings(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    let mut res: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => res.push(String::new()),
            Event::Text(t) if in_text && !in_phonetic => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    if let Some(s) = current.take() {
                        res.push(s);
                    }
                }
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(res)
}

// A cell being read: its column, its type attribute and its raw text.
struct PendingCell {
    col: usize,
    kind: Option<String>,
    value: String,
    inline: String,
}

impl PendingCell {
    fn new(e: &BytesStart, next_col: usize) -> PendingCell {
        let col = attr_value(e, b"r")
            .and_then(|r| column_index(&r))
            .unwrap_or(next_col);
        PendingCell {
            col,
            kind: attr_value(e, b"t"),
            value: String::new(),
            inline: String::new(),
        }
    }

    fn resolve(self, shared: &[String]) -> Cell {
        match self.kind.as_deref() {
            Some("s") => {
                let idx = self.value.trim().parse::<usize>().ok();
                match idx.and_then(|i| shared.get(i)) {
                    Some(s) => text_or_empty(s.clone()),
                    None => text_or_empty(self.value),
                }
            }
            Some("inlineStr") => text_or_empty(self.inline),
            Some("str") | Some("e") => text_or_empty(self.value),
            Some("b") => match self.value.trim() {
                "" => Cell::Empty,
                "1" => Cell::Number(1.0),
                _ => Cell::Number(0.0),
            },
            _ => {
                let v = self.value.trim();
                match v.parse::<f64>() {
                    Ok(f) if f.is_finite() => Cell::Number(f),
                    _ => text_or_empty(v.to_string()),
                }
            }
        }
    }
}

fn text_or_empty(s: String) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s)
    }
}

fn place(row: &mut Vec<Cell>, col: usize, cell: Cell) {
    if row.len() <= col {
        row.resize(col + 1, Cell::Empty);
    }
    row[col] = cell;
}

// Rows missing from the sheet data are empty rows.
fn skip_to_row(grid: &mut CellGrid, e: &BytesStart) {
    let number = attr_value(e, b"r").and_then(|r| r.trim().parse::<usize>().ok());
    if let Some(n) = number {
        while grid.len() + 1 < n {
            grid.push(Vec::new());
        }
    }
}

/// Decodes the rows of a worksheet. Cells are placed according to their
/// reference; the gaps are filled with empty cells.
pub fn parse_sheet(xml: &str, shared: &[String]) -> Result<CellGrid, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    let mut grid: CellGrid = Vec::new();
    let mut row: Option<Vec<Cell>> = None;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_inline = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    skip_to_row(&mut grid, &e);
                    row = Some(Vec::new());
                }
                b"c" => {
                    let next_col = row.as_ref().map(|r| r.len()).unwrap_or(0);
                    cell = Some(PendingCell::new(&e, next_col));
                }
                b"v" => in_value = true,
                b"t" if cell.is_some() => in_inline = true,
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"row" {
                    skip_to_row(&mut grid, &e);
                    grid.push(Vec::new());
                }
            }
            Event::Text(t) if in_value || in_inline => {
                if let Some(c) = cell.as_mut() {
                    let text = t.unescape()?;
                    if in_value {
                        c.value.push_str(&text);
                    } else {
                        c.inline.push_str(&text);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline = false,
                b"c" => {
                    if let (Some(pending), Some(r)) = (cell.take(), row.as_mut()) {
                        let col = pending.col;
                        place(r, col, pending.resolve(shared));
                    }
                }
                b"row" => {
                    if let Some(r) = row.take() {
                        grid.push(r);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(grid)
}
