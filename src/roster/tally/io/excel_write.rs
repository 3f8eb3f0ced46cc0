use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::roster::tally::error::Result;

/// A table that will be materialised as a single Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    /// Column widths in character units, one per column when present.
    pub widths: Vec<f64>,
    /// Height applied to the data rows.
    pub row_height: Option<f64>,
    pub rows: Vec<Vec<String>>,
}

/// Writes `table` to a new workbook at `path`, replacing any existing file.
pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    let header_format = Format::new().set_bold();
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }
    for (col_idx, width) in table.widths.iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, *width)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        if let Some(height) = table.row_height {
            worksheet.set_row_height(sheet_row, height)?;
        }
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string(sheet_row, col_idx as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}
