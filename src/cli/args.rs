//! CLI argument definitions using clap
//!
//! Commands:
//! - census serve --config <path>
//! - census ingest --config <path>
//! - census decode <sheet> <file>
//! - census plan <collection> --param key=value ...

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Census - datasheet ingestion and collection query service
#[derive(Parser, Debug)]
#[command(name = "census")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the ingestion loop and serve the query API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single ingestion cycle and report the built collections
    Ingest {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Decode one datasheet file and print its records as JSON
    Decode {
        /// Record shape of the file
        #[arg(value_enum)]
        sheet: SheetKind,

        /// Datasheet file to read
        file: PathBuf,
    },

    /// Compile a query and print its pipeline without running it
    Plan {
        /// Target collection
        collection: String,

        /// Query parameter, repeatable
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
}

/// Datasheets the decoder knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SheetKind {
    Currency,
    Experience,
    Faction,
    ImageSet,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
