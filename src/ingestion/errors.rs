//! # Ingestion Errors
//!
//! Failures of one refresh cycle. The worker counts them and retries the
//! whole cycle; none of them is retried in place.

use std::io;

use thiserror::Error;

use crate::datasheet::{DatasheetError, ErrorKind};

/// Result type for ingestion operations
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// A builder needed a datasheet the cache does not hold
    #[error("Missing upstream data: {0}")]
    MissingUpstreamData(&'static str),

    /// A datasheet could not be decoded
    #[error("Failed to decode {file}: {source}")]
    Datasheet {
        file: &'static str,
        source: DatasheetError,
    },

    /// A datasheet could not be read from its source
    #[error("Failed to read {file}: {source}")]
    Source { file: String, source: io::Error },

    /// A collection could not be published
    #[error("Failed to publish collection {collection}: {reason}")]
    Publish { collection: String, reason: String },

    /// A builder rejected its input
    #[error("Failed to build collection {collection}: {reason}")]
    Build {
        collection: &'static str,
        reason: String,
    },

    /// Shutdown was requested mid-cycle
    #[error("Ingestion cancelled")]
    Cancelled,

    /// The loop gave up after too many consecutive failed cycles
    #[error("Ingestion stopped after {failures} consecutive failures")]
    RetriesExhausted { failures: u32 },
}

impl IngestionError {
    /// Wraps a decode failure, keeping cancellation distinct
    pub fn datasheet(file: &'static str, source: DatasheetError) -> Self {
        if source.kind() == ErrorKind::Cancelled {
            IngestionError::Cancelled
        } else {
            IngestionError::Datasheet { file, source }
        }
    }

    /// Returns true if the cycle ended because shutdown was requested
    pub fn is_cancelled(&self) -> bool {
        matches!(self, IngestionError::Cancelled)
    }
}
