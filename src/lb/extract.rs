// From the cells of the worksheet to the players of the leaderboard.

use std::collections::HashMap;

use crate::lb::io_common::column_letters;
use crate::lb::io_output::FIXED_COLUMNS;
use crate::lb::*;

/// What a column holds, judging from its header only.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HeaderRole {
    Name,
    Spend,
    Total,
    /// A position or rank computed by someone else. Never a round.
    Position,
    /// A header that looks like a round label (R01, Round 2).
    Round,
    /// Anything else. It is a round if its cells are numeric.
    Other,
}

pub trait ColumnClassifier {
    fn classify(&self, header: &str) -> HeaderRole;
}

const NAME_HEADERS: &[&str] = &["player", "name", "player name", "competitor", "team"];
const SPEND_PATTERNS: &[&str] = &["spend", "spent", "$m", "$"];
const TOTAL_PATTERNS: &[&str] = &["total", "pts", "points"];
const POSITION_HEADERS: &[&str] = &["pos", "position", "rank", "#"];

// Cell values that mean "no score" in a round.
const ZERO_MARKERS: &[&str] = &["", "-", "D$Q"];

/// The default header rules.
///
/// When `name_column` is set, only that header (ignoring case) is the name
/// column.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HeaderPatterns {
    pub name_column: Option<String>,
}

impl HeaderPatterns {
    pub fn new(name_column: Option<String>) -> HeaderPatterns {
        HeaderPatterns { name_column }
    }
}

fn is_round_label(h: &str) -> bool {
    let digits = if let Some(rest) = h.strip_prefix("round") {
        rest.trim_start()
    } else if let Some(rest) = h.strip_prefix('r') {
        rest
    } else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl ColumnClassifier for HeaderPatterns {
    fn classify(&self, header: &str) -> HeaderRole {
        let h = header.trim().to_lowercase();
        let is_name = match &self.name_column {
            Some(forced) => h == forced.trim().to_lowercase(),
            None => NAME_HEADERS.contains(&h.as_str()),
        };
        if is_name {
            HeaderRole::Name
        } else if SPEND_PATTERNS.iter().any(|p| h.contains(p)) {
            HeaderRole::Spend
        } else if TOTAL_PATTERNS.iter().any(|p| h.contains(p)) {
            HeaderRole::Total
        } else if POSITION_HEADERS.contains(&h.as_str()) {
            HeaderRole::Position
        } else if is_round_label(&h) {
            HeaderRole::Round
        } else {
            HeaderRole::Other
        }
    }
}

/// The players read from a worksheet, along with the labels of the round
/// columns (unique, in column order).
#[derive(PartialEq, Debug, Clone)]
pub struct Leaderboard {
    pub round_labels: Vec<String>,
    pub players: Vec<PlayerRecord>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct ColumnLayout {
    name: usize,
    spend: Option<usize>,
    total: Option<usize>,
    rounds: Vec<(usize, String)>,
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn numeric_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(f) if f.is_finite() => Some(*f),
        Cell::Text(s) => parse_number(s),
        _ => None,
    }
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(f) => format!("{}", f),
    }
}

/// The score of a round. Blanks, `-`, `D$Q` and anything that is not a
/// number count as zero.
pub fn round_score(cell: Option<&Cell>) -> f64 {
    let cell = match cell {
        Some(c) => c,
        None => return 0.0,
    };
    if let Some(f) = numeric_value(cell) {
        return f;
    }
    if let Cell::Text(s) = cell {
        if !ZERO_MARKERS.contains(&s.trim()) {
            debug!("round_score: treating {:?} as zero", s);
        }
    }
    0.0
}

/// The spend of a player: `$1,234.50` is 1234.5. Anything unreadable is zero.
pub fn spend_value(cell: Option<&Cell>) -> f64 {
    match cell {
        Some(Cell::Number(f)) if f.is_finite() => *f,
        Some(Cell::Text(s)) => {
            let cleaned = s.replace(|c: char| c == ',' || c == '$', "");
            parse_number(&cleaned).unwrap_or_else(|| {
                debug!("spend_value: treating {:?} as zero", s);
                0.0
            })
        }
        _ => 0.0,
    }
}

// Trailing empty cells depend on the decoder, so they do not count.
fn used_width(row: &[Cell]) -> usize {
    row.iter()
        .rposition(|c| !cell_text(c).is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

fn header_label(cell: &Cell, idx: usize) -> String {
    let label = cell_text(cell);
    if label.is_empty() {
        format!("COL_{}", column_letters(idx))
    } else {
        label
    }
}

fn classify_columns(
    labels: &[String],
    data: &[&Vec<Cell>],
    classifier: &dyn ColumnClassifier,
) -> LbResult<ColumnLayout> {
    let mut name: Option<usize> = None;
    let mut spend: Option<usize> = None;
    let mut total: Option<usize> = None;
    let mut rounds: Vec<(usize, String)> = Vec::new();

    // Round labels must not collide with each other or with the output columns.
    let mut seen: HashMap<String, usize> = FIXED_COLUMNS
        .iter()
        .map(|c| (c.to_string(), 1))
        .collect();

    for (col, label) in labels.iter().enumerate() {
        let role = classifier.classify(label);
        let is_round = match role {
            HeaderRole::Name if name.is_none() => {
                name = Some(col);
                false
            }
            HeaderRole::Spend if spend.is_none() => {
                spend = Some(col);
                false
            }
            HeaderRole::Total if total.is_none() => {
                total = Some(col);
                false
            }
            HeaderRole::Round => true,
            HeaderRole::Other => data
                .iter()
                .any(|row| row.get(col).and_then(numeric_value).is_some()),
            _ => false,
        };
        debug!(
            "classify_columns: column {} {:?}: {:?} round: {:?}",
            column_letters(col),
            label,
            role,
            is_round
        );
        if is_round {
            let count = seen.entry(label.clone()).or_insert(0);
            *count += 1;
            let unique = if *count == 1 {
                label.clone()
            } else {
                format!("{}_{}", label, count)
            };
            rounds.push((col, unique));
        }
    }

    let name = name.context(MissingNameColumnSnafu {
        headers: labels.join(", "),
    })?;
    Ok(ColumnLayout {
        name,
        spend,
        total,
        rounds,
    })
}

/// Reads the players from the cells of a worksheet.
///
/// The first row holds the headers. Rows without a player name are skipped.
/// Individual cells never cause an error: unreadable values count as zero.
pub fn extract_players(
    grid: &CellGrid,
    classifier: &dyn ColumnClassifier,
) -> LbResult<Leaderboard> {
    let mut iter = grid.iter();
    let header = iter.next().context(MissingHeaderRowSnafu {})?;
    ensure!(
        header.iter().any(|c| !cell_text(c).is_empty()),
        MissingHeaderRowSnafu {}
    );
    debug!("extract_players: header: {:?}", header);

    let data: Vec<&Vec<Cell>> = iter.collect();
    let width = grid.iter().map(|r| used_width(r)).max().unwrap_or(0);
    let labels: Vec<String> = (0..width)
        .map(|idx| match header.get(idx) {
            Some(c) => header_label(c, idx),
            None => header_label(&Cell::Empty, idx),
        })
        .collect();
    let layout = classify_columns(&labels, &data, classifier)?;
    info!(
        "extract_players: name column: {:?}, spend column: {:?}, total column: {:?}",
        labels[layout.name],
        layout.spend.map(|c| labels[c].as_str()),
        layout.total.map(|c| labels[c].as_str())
    );

    let mut players: Vec<PlayerRecord> = Vec::new();
    for (idx, row) in data.iter().enumerate() {
        // Row 1 is the header.
        let lineno = idx + 2;
        let name = row.get(layout.name).map(cell_text).unwrap_or_default();
        if name.is_empty() {
            debug!("extract_players: row {}: no player name, skipping", lineno);
            continue;
        }
        let round_scores: Vec<f64> = layout
            .rounds
            .iter()
            .map(|(col, _)| round_score(row.get(*col)))
            .collect();
        let spend = layout
            .spend
            .map(|col| spend_value(row.get(col)))
            .unwrap_or(0.0);
        let explicit_total = layout
            .total
            .and_then(|col| row.get(col))
            .and_then(numeric_value);
        let player = PlayerRecord {
            name,
            round_scores,
            spend,
            explicit_total,
        };
        debug!("extract_players: row {}: {:?}", lineno, player);
        players.push(player);
    }

    Ok(Leaderboard {
        round_labels: layout.rounds.into_iter().map(|(_, label)| label).collect(),
        players,
    })
}
