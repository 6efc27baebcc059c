//! Command-line interface
//!
//! - serve: ingestion loop plus the HTTP query API
//! - ingest: one ingestion cycle, report printed as JSON
//! - decode: one datasheet file printed as JSON records
//! - plan: one query compiled and printed as a pipeline

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SheetKind};
pub use commands::{decode, ingest, plan, run, run_command, serve};
pub use errors::{CliError, CliResult};
pub use io::write_json;
