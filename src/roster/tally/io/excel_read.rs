use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::roster::tally::error::{Result, SyncError};

/// Reads the first worksheet of the workbook at `path` as rows of text cells.
/// The first row holds the headers.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SyncError::ImportFormat("workbook has no worksheet".into()))?
        .map_err(SyncError::from)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}
