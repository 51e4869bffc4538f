use super::CellValue;

/// A named column of typed cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header name
    pub name: String,

    /// Cell values, aligned by row index across all columns
    pub values: Vec<CellValue>,
}

impl Column {
    /// A column is numeric when it holds at least one number and every
    /// non-empty cell is a number. Mixed columns are treated as text.
    pub fn is_numeric(&self) -> bool {
        let mut any_number = false;
        for value in &self.values {
            match value {
                CellValue::Number(_) => any_number = true,
                CellValue::Text(_) => return false,
                CellValue::Empty => {}
            }
        }
        any_number
    }

    /// Non-empty numeric values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_number).collect()
    }

    pub fn non_empty_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }
}

/// Rows-and-named-columns table derived from parsing an upload.
/// Created per request and discarded once the response is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub columns: Vec<Column>,
}

impl DataTable {
    /// Build a table from a header row and string data rows.
    ///
    /// Rows shorter than the header are padded with empty cells; extra
    /// trailing fields are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in &rows {
            for (idx, column) in columns.iter_mut().enumerate() {
                let raw = row.get(idx).map(String::as_str).unwrap_or("");
                column.values.push(CellValue::from_raw(raw));
            }
        }

        Self { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }
}
