// Spreadsheet coordinates.

/// Converts a 0-based column index to spreadsheet letters (0 -> A, 26 -> AA).
pub fn column_letters(idx: usize) -> String {
    let mut n = idx + 1;
    let mut letters: Vec<char> = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The 0-based column index of a cell reference such as `C12`.
pub fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<char> = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    // The last column of a worksheet is XFD.
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut res: usize = 0;
    for ch in letters {
        res = res * 26 + (ch.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
    }
    Some(res - 1)
}
