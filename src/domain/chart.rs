use super::stats::SummaryStats;

/// Outcome of correlation-chart generation for one analysis.
///
/// Rendering is best-effort: the statistics payload stays valid whether or
/// not a chart was produced, and callers can tell a skipped chart (nothing
/// to plot) from a failed one (render backend or store error).
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// Chart rendered and persisted under `chart_id` in the charts store.
    Rendered { chart_id: String },

    /// The table had no numeric columns, so there was nothing to correlate.
    SkippedNoNumericColumns,

    /// Rendering or persistence failed; the analysis is still usable.
    Failed { reason: String },
}

impl ChartOutcome {
    pub fn chart_id(&self) -> Option<&str> {
        match self {
            ChartOutcome::Rendered { chart_id } => Some(chart_id),
            _ => None,
        }
    }
}

/// Result bundle of one analyze request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub summary: SummaryStats,
    pub chart: ChartOutcome,
}
