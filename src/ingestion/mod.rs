//! Periodic ingestion of client datasheets
//!
//! [`DatasheetSource`] supplies raw sheets, [`ClientDataCache`] decodes and
//! publishes them as one snapshot, the [`CollectionBuilder`]s turn the
//! snapshot into collections handed to a [`CollectionSink`], and
//! [`IngestionWorker`] repeats all of it on a timer.

mod builder;
mod cache;
mod errors;
mod source;
mod worker;

pub use builder::{
    default_builders, run_builders, BuildReport, CollectionBuilder, CollectionSink,
    CurrencyBuilder, ExperienceBuilder, FactionBuilder, ImageSetBuilder, SinkFuture,
};
pub use cache::{ClientData, ClientDataCache};
pub use errors::{IngestionError, IngestionResult};
pub use source::{DatasheetSource, DirectorySource, SourceFuture};
pub use worker::{IngestionWorker, RetryPolicy};
