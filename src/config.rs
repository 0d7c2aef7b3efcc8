//! Configuration management for Resize Streamer.
//!
//! Settings are layered, lowest precedence first:
//! - Built-in defaults
//! - The YAML config file (catalog plus optional `server` / `storage` sections)
//! - Command-line arguments and `RESIZE_`-prefixed environment variables
//!
//! # Example config file
//!
//! ```yaml
//! buckets:
//!   images: bucket-1
//! assortments:
//!   avatar:
//!     large: 1000x1000
//!     thumbnail: 30x0
//! server:
//!   port: 8080
//!   cache_dir: /var/cache/resize
//!   max_cache_files: 1000
//! storage:
//!   endpoint: http://localhost:9000
//!   region: us-east-1
//! ```
//!
//! # Environment Variables
//!
//! - `RESIZE_CONFIG` - Path to the YAML config file (default: config.yaml)
//! - `RESIZE_HOST` - Server bind address (default: 0.0.0.0)
//! - `RESIZE_PORT` - Server port (default: 8080)
//! - `RESIZE_CACHE_DIR` - Cache directory (default: ./cache)
//! - `RESIZE_MAX_CACHE_FILES` - Max cached variants (default: 1000)
//! - `RESIZE_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `RESIZE_S3_REGION` - AWS region (default: us-east-1)
//! - `RESIZE_JPEG_QUALITY` - JPEG output quality (default: 85)
//! - `RESIZE_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `RESIZE_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::cache::DEFAULT_MAX_CACHE_FILES;
use crate::error::ConfigError;
use crate::resize::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::resolve::Catalog;

// =============================================================================
// Default Values
// =============================================================================

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default cache directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Resize Streamer - on-demand image resizing from object storage.
///
/// Serves resized variants of originals stored in S3 or S3-compatible
/// storage, caching each variant on local disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "resize-streamer")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the YAML file with bucket aliases and assortments.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "RESIZE_CONFIG")]
    pub config: PathBuf,

    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RESIZE_HOST")]
    pub host: String,

    /// Port to listen on (overrides the config file).
    #[arg(short, long, env = "RESIZE_PORT")]
    pub port: Option<u16>,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Directory for cached variants (overrides the config file).
    #[arg(long, env = "RESIZE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of cached variants (overrides the config file).
    #[arg(long, env = "RESIZE_MAX_CACHE_FILES")]
    pub max_cache_files: Option<usize>,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// Custom S3 endpoint URL for S3-compatible services (MinIO, GCS, etc.).
    #[arg(long, env = "RESIZE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3 (overrides the config file).
    #[arg(long, env = "RESIZE_S3_REGION")]
    pub s3_region: Option<String>,

    // =========================================================================
    // Output Configuration
    // =========================================================================
    /// JPEG quality for encoded variants (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "RESIZE_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "RESIZE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RESIZE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Read the config file and merge it with the CLI arguments.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let file = ConfigFile::from_file(&self.config)?;
        let settings = self.resolve(file);
        settings.validate().map_err(ConfigError::Invalid)?;
        Ok(settings)
    }

    /// Merge a parsed config file under the CLI arguments.
    pub fn resolve(&self, file: ConfigFile) -> Settings {
        Settings {
            host: self.host.clone(),
            port: self.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            cache_dir: self
                .cache_dir
                .clone()
                .or(file.server.cache_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            max_cache_files: self
                .max_cache_files
                .or(file.server.max_cache_files)
                .unwrap_or(DEFAULT_MAX_CACHE_FILES),
            s3_endpoint: self.s3_endpoint.clone().or(file.storage.endpoint),
            s3_region: self
                .s3_region
                .clone()
                .or(file.storage.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            jpeg_quality: self.jpeg_quality,
            cache_max_age: self.cache_max_age,
            cors_origins: self.cors_origins.clone(),
            verbose: self.verbose,
            no_tracing: self.no_tracing,
            catalog: file.catalog,
        }
    }
}

// =============================================================================
// Config File
// =============================================================================

/// `server` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub cache_dir: Option<PathBuf>,
    pub max_cache_files: Option<usize>,
}

/// `storage` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSection {
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

/// Parsed YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Top-level `buckets` and `assortments` tables
    #[serde(flatten)]
    pub catalog: Catalog,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl ConfigFile {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

// =============================================================================
// Resolved Settings
// =============================================================================

/// Fully merged runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cache_dir: PathBuf,
    pub max_cache_files: usize,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub jpeg_quality: u8,
    pub cache_max_age: u32,
    pub cors_origins: Option<Vec<String>>,
    pub verbose: bool,
    pub no_tracing: bool,
    pub catalog: Catalog,
}

impl Settings {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_cache_files == 0 {
            return Err("max_cache_files must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        self.catalog.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
