//! Service configuration
//!
//! Loaded from a JSON file. Every field has a default, so a missing file
//! or an empty object yields a working configuration. A file that exists
//! but cannot be parsed is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "./census.json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid config JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusConfig {
    /// Directory holding extracted `*.txt` datasheets (default: "./datasheets")
    #[serde(default = "default_datasheet_dir")]
    pub datasheet_dir: PathBuf,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub ingestion: IngestionConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Ingestion loop timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Delay before retrying a failed cycle (default: 15)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Consecutive failures after which the loop stops (default: 5)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Delay between successful cycles (default: 3600)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

/// Query surface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Validity window of the collection listing (default: 3600)
    #[serde(default = "default_collection_cache_secs")]
    pub collection_cache_secs: u64,
}

fn default_datasheet_dir() -> PathBuf {
    PathBuf::from("./datasheets")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_retry_delay_secs() -> u64 {
    15
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_refresh_interval_secs() -> u64 {
    60 * 60
}

fn default_collection_cache_secs() -> u64 {
    60 * 60
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            datasheet_dir: default_datasheet_dir(),
            http: HttpConfig::default(),
            ingestion: IngestionConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay_secs(),
            max_consecutive_failures: default_max_consecutive_failures(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            collection_cache_secs: default_collection_cache_secs(),
        }
    }
}

impl CensusConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: CensusConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.ingestion.max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid(
                "ingestion.max_consecutive_failures must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl HttpConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl IngestionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl QueryConfig {
    pub fn collection_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.collection_cache_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CensusConfig::load(&dir.path().join("census.json")).unwrap();
        assert_eq!(config, CensusConfig::default());
        assert_eq!(config.http.socket_addr(), "0.0.0.0:5000");
        assert_eq!(config.ingestion.retry_delay(), Duration::from_secs(15));
        assert_eq!(config.ingestion.max_consecutive_failures, 5);
        assert_eq!(config.ingestion.refresh_interval(), Duration::from_secs(3600));
        assert_eq!(config.query.collection_cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("census.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"datasheet_dir": "/data", "http": {{"port": 8080}}}}"#).unwrap();

        let config = CensusConfig::load(&path).unwrap();
        assert_eq!(config.datasheet_dir, PathBuf::from("/data"));
        assert_eq!(config.http.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.ingestion.retry_delay_secs, 15);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("census.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CensusConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_failure_limit_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("census.json");
        fs::write(&path, r#"{"ingestion": {"max_consecutive_failures": 0}}"#).unwrap();
        assert!(matches!(
            CensusConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
