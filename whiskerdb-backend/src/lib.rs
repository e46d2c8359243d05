use anyhow::Context;
use config::{Command, Config};
use decoder::JsonDecoder;
use ingest::{BatchReport, IngestContext, ingest_metadata, ingest_trials};

pub mod config;
pub mod db;
pub mod decoder;
pub mod ingest;
pub mod logging;

/// Prepares the store described by `config`: connects, migrates and seeds
/// the canonical vocabulary entries.
///
/// # Errors
pub fn open_context(config: &Config) -> anyhow::Result<IngestContext> {
    let vocabularies = config.vocabularies()?;

    let mut db_conn = db::connect(config.db_path())
        .context(format!("failed to open store at {}", config.db_path()))?;

    db::run_migrations(&mut db_conn).context("failed to run store migrations")?;
    tracing::info!("ran store migrations");

    db::seed_data::SeedData::from(&vocabularies)
        .write(&mut db_conn)
        .context("failed to insert seed data")?;
    tracing::info!("inserted seed data");

    IngestContext::new(db_conn, vocabularies).context("failed to build vocabularies")
}

/// Runs the passes selected by `command`, in order.
///
/// # Errors
/// Setup failures and store connection failures. Skipped records are only
/// counted in the returned reports.
pub fn run(command: &Command) -> anyhow::Result<Vec<BatchReport>> {
    let config = command.config();
    let mut ctx = open_context(config)?;
    let decoder = JsonDecoder;

    let mut reports = Vec::with_capacity(2);

    if matches!(command, Command::Ingest(_) | Command::All(_)) {
        reports.push(ingest_metadata(&mut ctx, &decoder, config.metadata_dir())?);
    }

    if matches!(command, Command::Trials(_) | Command::All(_)) {
        reports.push(ingest_trials(&mut ctx, &decoder, config.datafile_dir())?);
    }

    Ok(reports)
}
