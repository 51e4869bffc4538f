// ============================================================
// CORRELATE USE CASE
// ============================================================
// Pairwise Pearson correlation over the numeric columns of a table

use crate::domain::stats::CorrelationMatrix;
use crate::domain::table::{CellValue, Column, DataTable};

/// Compute the pairwise Pearson correlation matrix over the table's
/// numeric columns. Non-numeric columns are excluded, never coerced.
///
/// Pairs are formed row-wise from rows where both cells hold a number, so
/// a blank in one column drops only that row from that one pair. The
/// diagonal is 1.0 by definition; pairs without variance come out as NaN.
pub fn correlation_matrix(table: &DataTable) -> CorrelationMatrix {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return CorrelationMatrix::empty();
    }

    let n = numeric.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(numeric[i], numeric[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let labels = numeric.iter().map(|c| c.name.clone()).collect();
    CorrelationMatrix::new(labels, values)
}

fn pearson(a: &Column, b: &Column) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .values
        .iter()
        .zip(b.values.iter())
        .filter_map(|(x, y)| match (x, y) {
            (CellValue::Number(x), CellValue::Number(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
