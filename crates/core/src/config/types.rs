use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist.
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// Config file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Config parsed but carries invalid values.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub editor: EditorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("darkroom.db")
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for stored objects.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

/// Remote editing service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditorConfig {
    /// Service base URL (e.g., "https://api.imagen.example").
    pub base_url: String,
    /// Service API key. An empty key fails jobs at orchestration time
    /// without touching the service.
    #[serde(default)]
    pub api_key: String,
    /// Editing profile for RAW batches.
    #[serde(default)]
    pub raw_profile_id: Option<String>,
    /// Editing profile for JPG-only batches.
    #[serde(default)]
    pub jpg_profile_id: Option<String>,
    /// Request timeout in seconds (default: 120; RAW transfers are slow).
    #[serde(default = "default_editor_timeout")]
    pub timeout_secs: u32,
}

fn default_editor_timeout() -> u32 {
    120
}

/// Pipeline tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Seconds between poll runs.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Page cap for the poller's job scan.
    #[serde(default = "default_scan_max_pages")]
    pub scan_max_pages: usize,
    /// Concurrent uploads per batch during orchestration.
    #[serde(default = "default_upload_batch_size")]
    pub upload_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            scan_max_pages: default_scan_max_pages(),
            upload_batch_size: default_upload_batch_size(),
        }
    }
}

fn default_poll_interval() -> u64 {
    120
}

fn default_scan_max_pages() -> usize {
    8
}

fn default_upload_batch_size() -> usize {
    5
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub editor: SanitizedEditorConfig,
    pub pipeline: PipelineConfig,
}

/// Sanitized editor config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEditorConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub raw_profile_id: Option<String>,
    pub jpg_profile_id: Option<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            editor: SanitizedEditorConfig {
                base_url: config.editor.base_url.clone(),
                api_key_configured: !config.editor.api_key.is_empty(),
                raw_profile_id: config.editor.raw_profile_id.clone(),
                jpg_profile_id: config.editor.jpg_profile_id.clone(),
                timeout_secs: config.editor.timeout_secs,
            },
            pipeline: config.pipeline.clone(),
        }
    }
}
