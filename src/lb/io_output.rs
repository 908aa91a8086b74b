// Writing the ranked leaderboard.

use serde_json::json;
use serde_json::Map as JSMap;

use crate::lb::*;

pub const CSV_FILE_NAME: &str = "leaderboard_normalized.csv";
pub const JSON_FILE_NAME: &str = "leaderboard_normalized.json";

/// The columns written around the round scores. Round labels never reuse
/// these names.
pub const FIXED_COLUMNS: &[&str] = &[
    "name",
    "spend",
    "total",
    "rank",
    "tie_group",
    "tie_highlight",
];

fn header_row(round_labels: &[String]) -> Vec<String> {
    let mut res: Vec<String> = vec!["name".to_string()];
    res.extend(round_labels.iter().cloned());
    res.extend(FIXED_COLUMNS[1..].iter().map(|c| c.to_string()));
    res
}

fn csv_row(entry: &RankedEntry) -> Vec<String> {
    let mut res: Vec<String> = vec![entry.player.name.clone()];
    res.extend(entry.player.round_scores.iter().map(|s| s.to_string()));
    res.push(entry.player.spend.to_string());
    res.push(entry.total.to_string());
    res.push(entry.rank.to_string());
    res.push(entry.tie_group.to_string());
    res.push(entry.tie_highlight.to_string());
    res
}

/// The leaderboard as a JSON array, one object per player, with the same
/// fields as the CSV file.
pub fn entries_to_json(round_labels: &[String], entries: &[RankedEntry]) -> JSValue {
    let mut l: Vec<JSValue> = Vec::new();
    for entry in entries {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        obj.insert("name".to_string(), json!(entry.player.name));
        for (label, score) in round_labels.iter().zip(entry.player.round_scores.iter()) {
            obj.insert(label.clone(), json!(score));
        }
        obj.insert("spend".to_string(), json!(entry.player.spend));
        obj.insert("total".to_string(), json!(entry.total));
        obj.insert("rank".to_string(), json!(entry.rank));
        obj.insert("tie_group".to_string(), json!(entry.tie_group));
        obj.insert("tie_highlight".to_string(), json!(entry.tie_highlight));
        l.push(JSValue::Object(obj));
    }
    JSValue::Array(l)
}

fn write_csv(path: &Path, round_labels: &[String], entries: &[RankedEntry]) -> LbResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu {
        path: path_s.clone(),
    })?;
    wtr.write_record(header_row(round_labels))
        .context(WritingCsvSnafu {
            path: path_s.clone(),
        })?;
    for entry in entries {
        wtr.write_record(csv_row(entry)).context(WritingCsvSnafu {
            path: path_s.clone(),
        })?;
    }
    wtr.flush().context(WritingFileSnafu { path: path_s })?;
    Ok(())
}

fn write_json(path: &Path, round_labels: &[String], entries: &[RankedEntry]) -> LbResult<()> {
    let js = entries_to_json(round_labels, entries);
    let mut pretty = serde_json::to_string_pretty(&js).context(WritingJsonSnafu {})?;
    pretty.push('\n');
    fs::write(path, pretty).context(WritingFileSnafu {
        path: path.display().to_string(),
    })
}

/// Writes the CSV and JSON files in `out_dir`, creating it if needed.
/// Existing files are overwritten. Returns the paths of the two files.
pub fn write_outputs(
    out_dir: &Path,
    round_labels: &[String],
    entries: &[RankedEntry],
) -> LbResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir).context(CreatingOutputDirSnafu {
        path: out_dir.display().to_string(),
    })?;
    let csv_path = out_dir.join(CSV_FILE_NAME);
    let json_path = out_dir.join(JSON_FILE_NAME);

    write_csv(&csv_path, round_labels, entries)?;
    info!("write_outputs: wrote {:?}", csv_path);
    write_json(&json_path, round_labels, entries)?;
    info!("write_outputs: wrote {:?}", json_path);
    Ok((csv_path, json_path))
}
