use std::fs;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use garde::Validate;
use serde::{Deserialize, Serialize};
use whiskerdb_core::{
    error::VocabularyError,
    identifier::DEFAULT_CELL_SUFFIX,
    location::Hemisphere,
    model::location::CoordinateReference,
    vocabulary::{Vocabulary, VocabularySpec},
};

#[derive(Args, Deserialize, Clone, Debug)]
pub struct Config {
    #[arg(long, env = "WHISKERDB_DB_PATH", default_value = "whiskerdb.sqlite")]
    db_path: String,
    #[arg(long, env = "WHISKERDB_METADATA_DIR", default_value = "data/metadata")]
    metadata_dir: Utf8PathBuf,
    #[arg(long, env = "WHISKERDB_DATAFILE_DIR", default_value = "data/datafiles")]
    datafile_dir: Utf8PathBuf,
    #[arg(long, env = "WHISKERDB_VOCABULARY_PATH")]
    vocabulary_path: Option<Utf8PathBuf>,
}

impl Config {
    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[must_use]
    pub fn metadata_dir(&self) -> &Utf8Path {
        &self.metadata_dir
    }

    #[must_use]
    pub fn datafile_dir(&self) -> &Utf8Path {
        &self.datafile_dir
    }

    /// The vocabulary file if one was given, otherwise the built-in
    /// defaults.
    ///
    /// # Errors
    pub fn vocabularies(&self) -> anyhow::Result<Vocabularies> {
        match &self.vocabulary_path {
            Some(path) => Vocabularies::from_file(path),
            None => Ok(Vocabularies::default()),
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Load whisker-task electrophysiology data into a relational store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    #[arg(long, env = "WHISKERDB_LOG_DIR", global = true)]
    pub log_dir: Option<Utf8PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load subjects, sessions, cells, stimulations and injections from
    /// metadata files
    Ingest(Config),
    /// Load trials and time series for sessions that have none yet
    Trials(Config),
    /// Run `ingest` followed by `trials`
    All(Config),
}

impl Command {
    #[must_use]
    pub fn config(&self) -> &Config {
        match self {
            Self::Ingest(config) | Self::Trials(config) | Self::All(config) => config,
        }
    }
}

/// Controlled vocabularies and the conventions of the source dataset that
/// cannot be read from the files themselves.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq)]
#[serde(default)]
pub struct Vocabularies {
    #[garde(length(min = 1))]
    pub default_species: String,
    #[garde(dive)]
    pub animal_sources: VocabularySpec,
    #[garde(dive)]
    pub strains: VocabularySpec,
    #[garde(skip)]
    pub hemisphere: Hemisphere,
    #[garde(pattern(r"^[A-Z]{4}$"))]
    pub cell_id_suffix: String,
    #[garde(length(min = 1))]
    pub photostim_device: String,
    #[garde(skip)]
    pub coordinate_reference: CoordinateReference,
    #[garde(length(min = 1))]
    pub metadata_root: String,
    #[garde(length(min = 1))]
    pub datafile_root: String,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            default_species: "Mus musculus".to_string(),
            animal_sources: VocabularySpec::new([
                ("Jackson", "JAX"),
                ("JAX", "JAX"),
                ("home", "Homemade"),
            ]),
            strains: VocabularySpec::new([("C57BL/6J", "000664"), ("000664", "000664")]),
            hemisphere: Hemisphere::Left,
            cell_id_suffix: DEFAULT_CELL_SUFFIX.to_string(),
            photostim_device: "laser".to_string(),
            coordinate_reference: CoordinateReference::Bregma,
            metadata_root: "meta_data".to_string(),
            datafile_root: "c".to_string(),
        }
    }
}

impl Vocabularies {
    /// # Errors
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let vocabularies: Self = toml::from_str(contents).context("failed to parse vocabularies")?;
        vocabularies
            .validate()
            .context("invalid vocabularies")?;

        Ok(vocabularies)
    }

    /// # Errors
    pub fn from_file(path: &Utf8Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("failed to read vocabulary file {path}"))?;

        Self::from_toml(&contents).context(format!("failed to load vocabulary file {path}"))
    }

    /// # Errors
    pub fn animal_source_resolver(&self) -> Result<Vocabulary, VocabularyError> {
        Vocabulary::new("animal_source", &self.animal_sources)
    }

    /// # Errors
    pub fn strain_resolver(&self) -> Result<Vocabulary, VocabularyError> {
        Vocabulary::new("strain", &self.strains)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Vocabularies::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let vocabularies = Vocabularies::from_toml(
            r#"
            hemisphere = "right"

            [strains]
            default = "N/A"
            aliases = [{ alias = "L7", canonical = "L7-cre" }]
            "#,
        )
        .unwrap();

        assert_eq!(vocabularies.hemisphere, Hemisphere::Right);
        assert_eq!(vocabularies.strains.canonical_entries(), vec!["L7-cre", "N/A"]);
        assert_eq!(vocabularies.default_species, "Mus musculus");
    }

    #[rstest]
    #[case(r#"cell_id_suffix = "aa""#)]
    #[case(r#"default_species = """#)]
    #[case(r#"
        [animal_sources]
        default = "N/A"
        aliases = [{ alias = "", canonical = "JAX" }]
    "#)]
    fn invalid_files_are_rejected(#[case] contents: &str) {
        assert!(Vocabularies::from_toml(contents).is_err());
    }
}
