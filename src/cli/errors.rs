//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::datasheet::DatasheetError;
use crate::ingestion::IngestionError;
use crate::query::QueryError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create tokio runtime: {0}")]
    Runtime(io::Error),

    #[error("HTTP server failed: {0}")]
    Server(io::Error),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error("Failed to read {}: {source}", path.display())]
    ReadInput { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Datasheet(#[from] DatasheetError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CENSUS_CLI_CONFIG_ERROR",
            CliError::Runtime(_) | CliError::Server(_) => "CENSUS_CLI_BOOT_FAILED",
            CliError::Ingestion(_) => "CENSUS_CLI_INGESTION_FAILED",
            CliError::ReadInput { .. } | CliError::Output(_) | CliError::Json(_) => {
                "CENSUS_CLI_IO_ERROR"
            }
            CliError::Datasheet(_) => "CENSUS_CLI_DECODE_FAILED",
            CliError::Query(_) => "CENSUS_CLI_QUERY_REJECTED",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
