//! census - datasheet ingestion and ad-hoc collection queries
//!
//! Two halves share this crate:
//!
//! - [`datasheet`] decodes `^`-delimited client datasheets into typed
//!   records, and [`ingestion`] turns them into collections on a timer
//! - [`query`] compiles query-string parameters into a plan that
//!   [`executor`] runs, and [`server`] exposes both over HTTP

pub mod cli;
pub mod config;
pub mod datasheet;
pub mod executor;
pub mod ingestion;
pub mod observability;
pub mod query;
pub mod server;
pub mod shutdown;
