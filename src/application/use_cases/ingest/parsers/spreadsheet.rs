// ============================================================
// SPREADSHEET PARSER
// ============================================================
// Workbook parsing (xlsx/xls/ods) via calamine, first worksheet only

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;

/// Parse spreadsheet content into a table.
///
/// The workbook format is sniffed from the bytes; the first worksheet's
/// first row is taken as the header. Cells are stringified and re-typed
/// by the table builder, so numeric cells survive as numbers.
pub fn parse(bytes: &[u8]) -> Result<DataTable> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AppError::ParseError(format!("failed to open spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("no worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("failed to read worksheet: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .ok_or_else(|| AppError::ParseError("worksheet is empty".to_string()))?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::ParseError("worksheet has no header row".to_string()));
    }

    let data_rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(DataTable::from_rows(headers, data_rows))
}

fn cell_to_string(cell: &Data) -> String {
    cell.as_string()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}", cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_bytes() {
        assert!(matches!(
            parse(b"definitely not a workbook"),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(parse(b""), Err(AppError::ParseError(_))));
    }
}
