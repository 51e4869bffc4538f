// ============================================================
// DESCRIBE USE CASE
// ============================================================
// All-column descriptive statistics over a parsed table

use std::collections::HashMap;

use crate::domain::stats::{ColumnSummary, SummaryStats};
use crate::domain::table::{Column, DataTable};

/// Compute per-column summary statistics across every column of the table,
/// numeric and non-numeric alike.
pub fn describe(table: &DataTable) -> SummaryStats {
    let mut stats = SummaryStats::default();
    for column in &table.columns {
        stats
            .columns
            .insert(column.name.clone(), summarize_column(column));
    }
    stats
}

fn summarize_column(column: &Column) -> ColumnSummary {
    if column.is_numeric() {
        summarize_numeric(column)
    } else {
        summarize_text(column)
    }
}

fn summarize_numeric(column: &Column) -> ColumnSummary {
    let mut values = column.numbers();
    // finite by construction, so a total order exists
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(var.sqrt())
    } else {
        None
    };

    ColumnSummary {
        count,
        mean: Some(mean),
        std,
        min: values.first().copied(),
        q25: Some(percentile(&values, 0.25)),
        median: Some(percentile(&values, 0.50)),
        q75: Some(percentile(&values, 0.75)),
        max: values.last().copied(),
        ..ColumnSummary::default()
    }
}

fn summarize_text(column: &Column) -> ColumnSummary {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for (idx, value) in column.values.iter().enumerate() {
        if let Some(display) = value.as_display() {
            *counts.entry(display.clone()).or_insert(0) += 1;
            first_seen.entry(display).or_insert(idx);
        }
    }

    // Ties resolve to the value seen first, keeping the output stable.
    let top = counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then(first_seen[*b].cmp(&first_seen[*a])))
        .map(|(value, _)| value.clone());
    let freq = top.as_ref().map(|t| counts[t]);

    ColumnSummary {
        count: column.non_empty_count(),
        unique: Some(counts.len()),
        top,
        freq,
        ..ColumnSummary::default()
    }
}

/// Linearly interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
