use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::error::{AppError, Result};

/// Service configuration: bind address and blob store directories.
///
/// Defaults are overridden by `tablescope.toml`, then by `TABLESCOPE_*`
/// environment variables (e.g. `TABLESCOPE_PORT=9000`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub charts_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            uploads_dir: PathBuf::from("uploads"),
            charts_dir: PathBuf::from("charts"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("tablescope.toml"))
            .merge(Env::prefixed("TABLESCOPE_"))
            .extract()
            .map_err(|e| AppError::Internal(format!("invalid configuration: {}", e)))
    }
}
