use serde::Serialize;

#[derive(thiserror::Error, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ParseError {
    #[error("unparseable {kind} identifier '{raw}'")]
    UnparseableIdentifier { kind: &'static str, raw: String },
    #[error("unparseable location '{raw}': {reason}")]
    UnparseableLocation { raw: String, reason: &'static str },
    #[error("unparseable date '{raw}'")]
    UnparseableDate { raw: String },
    #[error("no number found in '{raw}'")]
    UnparseableNumber { raw: String },
    #[error("unknown time unit '{raw}'")]
    UnknownTimeUnit { raw: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(thiserror::Error, Debug)]
#[error("invalid alias '{alias}' in vocabulary '{vocabulary}'")]
pub struct VocabularyError {
    pub vocabulary: String,
    pub alias: String,
    #[source]
    pub source: regex::Error,
}
