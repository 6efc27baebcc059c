//! CLI command implementations

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::CensusConfig;
use crate::datasheet::{
    Currency, Datasheet, DatasheetSerializer, Experience, Faction, ImageSetMapping,
};
use crate::executor::{DatatypeCache, MemoryStore, PlanExecutor};
use crate::ingestion::{ClientDataCache, DirectorySource, IngestionError, IngestionWorker, RetryPolicy};
use crate::observability::{Event, Logger};
use crate::query::{CollectionCatalog, QueryPlanBuilder};
use crate::server::{CensusServer, QueryState};
use crate::shutdown::{self, Shutdown};

use super::args::{Cli, Command, SheetKind};
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Ingest { config } => ingest(&config),
        Command::Decode { sheet, file } => decode(sheet, &file),
        Command::Plan { collection, params } => plan(&collection, &params),
    }
}

fn load_config(path: &Path) -> CliResult<CensusConfig> {
    Logger::info(Event::BootStart, &[]);
    let config = CensusConfig::load(path)?;
    Logger::info(
        Event::ConfigLoaded,
        &[
            ("datasheet_dir", &config.datasheet_dir.display().to_string()),
            ("path", &path.display().to_string()),
        ],
    );
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(CliError::Runtime)
}

fn worker(config: &CensusConfig, store: Arc<MemoryStore>) -> IngestionWorker {
    IngestionWorker::new(
        Arc::new(DirectorySource::new(&config.datasheet_dir)),
        Arc::new(ClientDataCache::default()),
        store,
        RetryPolicy::from(&config.ingestion),
    )
}

/// Runs the ingestion loop in the background and serves queries.
///
/// Ctrl-C stops both. The server keeps answering if ingestion gives up.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(QueryState::new(
        QueryPlanBuilder::new(Arc::new(CollectionCatalog::builtin())),
        Arc::clone(&store) as Arc<dyn PlanExecutor>,
        DatatypeCache::new(config.query.collection_cache_ttl()),
    ));
    let server = CensusServer::new(config.http.clone(), state);
    let worker = worker(&config, store);

    runtime()?.block_on(async move {
        let (trigger, shutdown) = shutdown::channel();

        let ingestion = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { worker.run(shutdown).await }
        });

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                Logger::info(Event::ShutdownStart, &[]);
                trigger.trigger();
            }
        });

        server.start(shutdown).await.map_err(CliError::Server)?;

        // The loop has already logged why it stopped
        let _ = ingestion.await;
        Logger::info(Event::ShutdownComplete, &[]);
        Ok(())
    })
}

#[derive(Serialize)]
struct IngestReport {
    built: Vec<&'static str>,
    failed: Vec<&'static str>,
    collections: Value,
}

/// Runs one ingestion cycle and prints what it built
pub fn ingest(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = Arc::new(MemoryStore::new());
    let worker = worker(&config, Arc::clone(&store));

    let report = runtime()?.block_on(async { worker.run_cycle(&Shutdown::never()).await })?;

    write_json(&IngestReport {
        built: report.built,
        failed: report.failed,
        collections: json!(store.datatypes()),
    })
}

fn decode_as<T: Datasheet + Serialize>(data: &[u8]) -> CliResult<Value> {
    let records = DatasheetSerializer::new().deserialize::<T>(data)?;
    Ok(serde_json::to_value(records)?)
}

/// Decodes a datasheet file and prints its records
pub fn decode(sheet: SheetKind, file: &Path) -> CliResult<()> {
    let data = fs::read(file).map_err(|source| CliError::ReadInput {
        path: file.to_path_buf(),
        source,
    })?;

    let records = match sheet {
        SheetKind::Currency => decode_as::<Currency>(&data)?,
        SheetKind::Experience => decode_as::<Experience>(&data)?,
        SheetKind::Faction => decode_as::<Faction>(&data)?,
        SheetKind::ImageSet => decode_as::<ImageSetMapping>(&data)?,
    };
    write_json(&records)
}

/// Compiles a query and prints the pipeline it renders to
pub fn plan(collection: &str, params: &[(String, String)]) -> CliResult<()> {
    let builder = QueryPlanBuilder::new(Arc::new(CollectionCatalog::builtin()));
    let plan = builder.build(collection, params)?;
    write_json(&json!({
        "collection": plan.collection,
        "pipeline": plan.to_pipeline(),
    }))
}
