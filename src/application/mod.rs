pub mod use_cases;

pub use use_cases::analyze::AnalyzeUseCase;
pub use use_cases::ingest::IngestUseCase;
