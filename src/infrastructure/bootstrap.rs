use std::sync::Arc;

use crate::application::use_cases::analyze::AnalyzeUseCase;
use crate::application::use_cases::ingest::IngestUseCase;
use crate::domain::error::Result;
use crate::infrastructure::chart::HeatmapRenderer;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::{BlobStore, LocalBlobStore};
use crate::interfaces::http::AppState;

/// Build the request-handling state from configuration: both blob stores
/// (directories created on startup) wired into the analyze pipeline.
pub fn bootstrap(config: &AppConfig) -> Result<AppState> {
    let uploads: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.uploads_dir)?);
    let charts: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.charts_dir)?);

    let analyze_use_case = AnalyzeUseCase::new(
        IngestUseCase::new(uploads),
        Arc::clone(&charts),
        HeatmapRenderer::default(),
    );

    Ok(AppState {
        analyze_use_case,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_creates_store_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            uploads_dir: dir.path().join("uploads"),
            charts_dir: dir.path().join("charts"),
            ..AppConfig::default()
        };

        bootstrap(&config).unwrap();
        assert!(config.uploads_dir.is_dir());
        assert!(config.charts_dir.is_dir());
    }
}
