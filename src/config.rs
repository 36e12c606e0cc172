use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::header;
use crate::ingestion::IngestOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub ingestion: IngestionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageSettings {
    /// Container (bucket) name the alarm reports live in.
    pub container: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheSettings {
    /// Staleness window for the corpus cache, in seconds.
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestionSettings {
    /// Rows inspected from the top of a document for the adaptive header
    /// scan.
    pub scan_window_rows: usize,
    /// Known constant header-row offset. When set, the adaptive scan is
    /// skipped and this offset is authoritative.
    pub fixed_header_row: Option<usize>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            container: "alarm-reports".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings { ttl_secs: 600 }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        IngestionSettings {
            scan_window_rows: header::DEFAULT_SCAN_WINDOW,
            fixed_header_row: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            storage: StorageSettings::default(),
            cache: CacheSettings::default(),
            ingestion: IngestionSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: PipelineConfig = toml::from_str(&content)
            .map_err(|e| PipelineError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides with the PIDS_ prefix on top of the
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(container) = std::env::var("PIDS_STORAGE_CONTAINER") {
            config.storage.container = container;
        }
        if let Ok(ttl) = std::env::var("PIDS_CACHE_TTL_SECS") {
            config.cache.ttl_secs = ttl
                .parse()
                .map_err(|_| PipelineError::config(format!("invalid PIDS_CACHE_TTL_SECS: {}", ttl)))?;
        }
        if let Ok(window) = std::env::var("PIDS_SCAN_WINDOW_ROWS") {
            config.ingestion.scan_window_rows = window.parse().map_err(|_| {
                PipelineError::config(format!("invalid PIDS_SCAN_WINDOW_ROWS: {}", window))
            })?;
        }
        if let Ok(row) = std::env::var("PIDS_FIXED_HEADER_ROW") {
            config.ingestion.fixed_header_row = Some(row.parse().map_err(|_| {
                PipelineError::config(format!("invalid PIDS_FIXED_HEADER_ROW: {}", row))
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.container.trim().is_empty() {
            return Err(PipelineError::config("storage container name cannot be empty"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(PipelineError::config("cache ttl must be positive"));
        }
        if self.ingestion.scan_window_rows == 0 {
            return Err(PipelineError::config("header scan window must be positive"));
        }
        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            scan_window: self.ingestion.scan_window_rows,
            fixed_header_row: self.ingestion.fixed_header_row,
        }
    }
}
