//! Lifecycle events for the census service
//!
//! Every log line names one of these events. Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Server bound and ready for requests
    Serving,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Ingestion
    /// A refresh cycle begins
    IngestionCycleBegin,
    /// One datasheet decoded into the client data snapshot
    DatasheetLoaded,
    /// Client data snapshot published
    ClientDataPublished,
    /// A collection was rebuilt and published
    CollectionBuilt,
    /// One collection builder failed; siblings continue
    CollectionBuildFailed,
    /// A refresh cycle completed
    IngestionCycleComplete,
    /// A refresh cycle failed and will be retried
    IngestionCycleFailed,
    /// Consecutive failures reached the limit (FATAL)
    IngestionRetriesExhausted,
    /// Ingestion loop stopped on request
    IngestionStopped,

    // Query
    /// Query compiled into a plan
    QueryPlanned,
    /// Query rejected before or during execution
    QueryRejected,
    /// Query executed successfully
    QueryExecuted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "CENSUS_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "CENSUS_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::IngestionCycleBegin => "INGESTION_CYCLE_BEGIN",
            Event::DatasheetLoaded => "DATASHEET_LOADED",
            Event::ClientDataPublished => "CLIENT_DATA_PUBLISHED",
            Event::CollectionBuilt => "COLLECTION_BUILT",
            Event::CollectionBuildFailed => "COLLECTION_BUILD_FAILED",
            Event::IngestionCycleComplete => "INGESTION_CYCLE_COMPLETE",
            Event::IngestionCycleFailed => "INGESTION_CYCLE_FAILED",
            Event::IngestionRetriesExhausted => "INGESTION_RETRIES_EXHAUSTED",
            Event::IngestionStopped => "INGESTION_STOPPED",

            Event::QueryPlanned => "QUERY_PLANNED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::IngestionRetriesExhausted)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
