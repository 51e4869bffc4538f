// ============================================================
// INGEST USE CASE
// ============================================================
// Persist an upload to the blob store, then parse it into a table

pub mod parsers;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;
use crate::infrastructure::storage::BlobStore;

/// Ingestion of one uploaded file: store the raw bytes under the original
/// filename, then parse them into a [`DataTable`] based on the extension.
pub struct IngestUseCase {
    uploads: Arc<dyn BlobStore>,
}

impl IngestUseCase {
    pub fn new(uploads: Arc<dyn BlobStore>) -> Self {
        Self { uploads }
    }

    /// Store and parse an upload.
    ///
    /// The write happens before parsing is attempted, so the raw file is
    /// kept even when the content turns out not to be tabular. A second
    /// upload under the same name overwrites the first.
    pub fn execute(&self, filename: &str, bytes: &[u8]) -> Result<DataTable> {
        let key = sanitize_filename(filename)?;
        self.uploads.put(&key, bytes)?;
        info!(filename = %key, size = bytes.len(), "Upload persisted");

        if has_csv_extension(&key) {
            parsers::csv::parse(bytes)
        } else {
            parsers::spreadsheet::parse(bytes)
        }
    }
}

/// Reduce an upload filename to its final path component so stored blobs
/// always land inside the uploads directory.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .ok_or_else(|| AppError::ParseError(format!("invalid upload filename: {:?}", filename)))
}

fn has_csv_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
