// ============================================================
// SUMMARY STATISTICS TYPES
// ============================================================
// Per-column aggregates and the pairwise correlation matrix

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics for a single column.
///
/// Numeric columns carry `mean` through `max`; text columns carry
/// `unique`/`top`/`freq`. Inapplicable statistics are absent from the
/// serialized form rather than null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of non-empty cells
    pub count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Sample standard deviation (n - 1); absent when fewer than two values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(rename = "25%", skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,

    #[serde(rename = "50%", skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,

    #[serde(rename = "75%", skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Number of distinct non-empty values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<usize>,

    /// Most frequent value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,

    /// Occurrences of the most frequent value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<usize>,
}

/// Mapping from column name to its summary. Serializes directly as the
/// nested `{column: {statistic: value}}` object of the analyze response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryStats {
    pub columns: BTreeMap<String, ColumnSummary>,
}

/// Square matrix of pairwise Pearson coefficients over numeric columns.
///
/// The diagonal is exactly 1.0; zero-variance pairs are NaN. Row and
/// column order both follow `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn new(labels: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        debug_assert!(values.len() == labels.len());
        debug_assert!(values.iter().all(|row| row.len() == labels.len()));
        Self { labels, values }
    }

    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}
