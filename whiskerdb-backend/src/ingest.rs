use std::{collections::BTreeMap, fmt::Display};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diesel::SqliteConnection;
use itertools::Itertools;
use serde::Serialize;
use whiskerdb_core::{
    error::{ParseError, VocabularyError},
    vocabulary::Vocabulary,
};

use crate::{
    config::Vocabularies,
    db::{self, model::sessions_without_trial_set},
    decoder::{DecodeError, Decoder},
};

mod reconciler;
mod record;
mod trials;

/// Pipeline stages, in the order a record passes through them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Decode,
    Subject,
    Session,
    Location,
    Cell,
    Photostim,
    Virus,
    Datafile,
    Series,
    Trials,
}

#[derive(thiserror::Error, Debug)]
pub enum Reason {
    #[error("missing required field '{0}'")]
    MissingValue(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("transaction rolled back: {0}")]
    TransactionFailure(#[source] db::error::Error),
    #[error(transparent)]
    Store(#[from] db::error::Error),
}

impl Reason {
    fn missing(field: impl Into<String>) -> Self {
        Self::MissingValue(field.into())
    }

    /// Failed multi-row writes are reported as rolled back unless the store
    /// itself went away.
    fn from_transaction(err: db::error::Error) -> Self {
        if err.is_fatal() {
            Self::Store(err)
        } else {
            Self::TransactionFailure(err)
        }
    }
}

/// Why a record stopped short of being committed.
#[derive(thiserror::Error, Debug)]
#[error("skipped at {stage}: {reason}")]
pub struct Skip {
    pub stage: Stage,
    #[source]
    pub reason: Reason,
}

impl Skip {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match &self.reason {
            Reason::Store(err) | Reason::TransactionFailure(err) => err.is_fatal(),
            _ => false,
        }
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, Skip>;
}

impl<T, E: Into<Reason>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, Skip> {
        self.map_err(|err| Skip {
            stage,
            reason: err.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchReport {
    pub pass: &'static str,
    pub processed: usize,
    pub committed: usize,
    pub skipped: BTreeMap<Stage, usize>,
    pub unmatched: usize,
}

impl BatchReport {
    fn new(pass: &'static str) -> Self {
        Self {
            pass,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn n_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Counts the outcome of one record. Skips are logged and counted; a
    /// fatal store failure ends the batch.
    fn settle(&mut self, outcome: Result<(), Skip>, record: &dyn Display) -> anyhow::Result<()> {
        match outcome {
            Ok(()) => self.committed += 1,
            Err(skip) if skip.is_fatal() => {
                return Err(anyhow::Error::new(skip)
                    .context(format!("store failure while processing {record}")));
            }
            Err(Skip { stage, reason }) => {
                tracing::warn!(record = %record, %stage, %reason, "skipped record");
                *self.skipped.entry(stage).or_default() += 1;
            }
        }

        Ok(())
    }

    fn log(&self) {
        tracing::info!(
            pass = self.pass,
            processed = self.processed,
            committed = self.committed,
            skipped = self.n_skipped(),
            unmatched = self.unmatched,
            "finished batch"
        );
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} processed, {} committed, {} skipped",
            self.pass,
            self.processed,
            self.committed,
            self.n_skipped()
        )?;

        if !self.skipped.is_empty() {
            let per_stage = self
                .skipped
                .iter()
                .map(|(stage, n)| format!("{stage}: {n}"))
                .join(", ");
            write!(f, " ({per_stage})")?;
        }

        if self.unmatched > 0 {
            write!(f, ", {} without a datafile", self.unmatched)?;
        }

        Ok(())
    }
}

/// The store handle and resolved vocabularies threaded through every
/// record.
pub struct IngestContext {
    db_conn: SqliteConnection,
    vocabularies: Vocabularies,
    animal_sources: Vocabulary,
    strains: Vocabulary,
}

impl IngestContext {
    /// # Errors
    pub fn new(
        db_conn: SqliteConnection,
        vocabularies: Vocabularies,
    ) -> Result<Self, VocabularyError> {
        let animal_sources = vocabularies.animal_source_resolver()?;
        let strains = vocabularies.strain_resolver()?;

        Ok(Self {
            db_conn,
            vocabularies,
            animal_sources,
            strains,
        })
    }
}

/// Files in `dir` with the given extension, sorted by name.
fn list_files(dir: &Utf8Path, extension: &str) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let entries = dir
        .read_dir_utf8()
        .context(format!("failed to read directory {dir}"))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context(format!("failed to read entry in {dir}"))?.into_path();
        if path.is_file() && path.extension() == Some(extension) {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

/// Reconciles every metadata file in `dir` against the store.
///
/// # Errors
/// Only for an unreadable directory or a store connection failure. Problems
/// with individual files are logged and counted in the report.
pub fn ingest_metadata(
    ctx: &mut IngestContext,
    decoder: &impl Decoder,
    dir: &Utf8Path,
) -> anyhow::Result<BatchReport> {
    let mut report = BatchReport::new("metadata");

    for path in list_files(dir, decoder.extension())? {
        report.processed += 1;
        let outcome = ctx.reconcile_file(decoder, &path);
        report.settle(outcome, &path)?;
    }

    report.log();

    Ok(report)
}

/// Loads trials and time series for every stored session that has no trial
/// set yet, from the matching datafile in `dir`.
///
/// # Errors
/// Only for an unreadable directory or a store failure outside a single
/// session.
pub fn ingest_trials(
    ctx: &mut IngestContext,
    decoder: &impl Decoder,
    dir: &Utf8Path,
) -> anyhow::Result<BatchReport> {
    let mut report = BatchReport::new("trials");

    let datafiles = list_files(dir, decoder.extension())?;
    let sessions =
        sessions_without_trial_set(&mut ctx.db_conn).context("failed to list pending sessions")?;

    for session in sessions {
        let key = session.key();
        report.processed += 1;

        let datafile = match ctx.find_datafile(&datafiles, &session).at(Stage::Datafile) {
            Ok(Some(datafile)) => datafile,
            Ok(None) => {
                tracing::warn!(session = %key, "no session datafile found");
                report.unmatched += 1;
                continue;
            }
            Err(skip) => {
                report.settle(Err(skip), &key)?;
                continue;
            }
        };

        let outcome = ctx.load_trials(decoder, datafile, &session);
        report.settle(outcome, &key)?;
    }

    report.log();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn report_summarizes_skips_per_stage() {
        let mut report = BatchReport::new("metadata");
        report.processed = 4;

        report.settle(Ok(()), &"a.json").unwrap();
        report
            .settle(Err(Reason::missing("animal_ID")).at(Stage::Decode), &"b.json")
            .unwrap();
        report
            .settle(
                Err(ParseError::UnparseableDate { raw: "x".to_string() }).at(Stage::Session),
                &"c.json",
            )
            .unwrap();
        report
            .settle(Err(Reason::missing("cell")).at(Stage::Decode), &"d.json")
            .unwrap();

        assert_eq!(report.committed, 1);
        assert_eq!(report.n_skipped(), 3);
        assert_eq!(
            report.to_string(),
            "metadata: 4 processed, 1 committed, 3 skipped (decode: 2, session: 1)"
        );
    }

    #[test]
    fn connection_loss_ends_the_batch() {
        let mut report = BatchReport::new("trials");
        let lost = db::error::Error::Connection {
            message: "closed".to_string(),
        };

        let result = report.settle(
            Err(Reason::from_transaction(lost)).at(Stage::Trials),
            &"anm1/Cell01",
        );

        assert!(result.is_err());
        assert_eq!(report.n_skipped(), 0);
    }

    #[test]
    fn rejected_transactions_are_not_fatal() {
        let rejected = db::error::Error::ReferenceNotFound {
            entity: "session_experimenter".to_string(),
            detail: None,
        };
        let skip = Err::<(), _>(Reason::from_transaction(rejected))
            .at(Stage::Session)
            .unwrap_err();

        assert!(matches!(skip.reason, Reason::TransactionFailure(_)));
        assert!(!skip.is_fatal());
    }
}
