use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::lb::*;

/// Reads one worksheet with calamine.
///
/// calamine starts the range at the first used cell. The grid is shifted back
/// so that column and row indexes match the sheet references.
pub fn read_calamine_grid(path: &Path, worksheet: Option<&str>) -> LbResult<CellGrid> {
    let path_s = path.display().to_string();
    let mut workbook: Xlsx<_> = open_workbook::<Xlsx<_>, _>(path).context(OpeningExcelSnafu {
        path: path_s.clone(),
    })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(MissingHeaderRowSnafu {})?,
    }
    .context(OpeningExcelSnafu { path: path_s })?;

    let (first_row, first_col) = wrange.start().unwrap_or((0, 0));
    let mut grid: CellGrid = vec![Vec::new(); first_row as usize];
    grid.extend(wrange.rows().map(|row| {
        let mut cells: Vec<Cell> = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(read_cell_calamine));
        cells
    }));
    debug!(
        "read_calamine_grid: {:?} rows from {:?}, first row: {:?}",
        grid.len(),
        (first_row, first_col),
        grid.get(first_row as usize)
    );
    Ok(grid)
}

fn read_cell_calamine(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::Error(e) => Cell::Text(format!("{:?}", e)),
        _ => Cell::Empty,
    }
}
