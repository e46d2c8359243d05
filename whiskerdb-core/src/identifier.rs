use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    date::{DATE_FORMAT_YDM, DATE_FORMAT_YMD},
    error::{ParseError, Result},
};

pub const DEFAULT_CELL_SUFFIX: &str = "AAAA";

static SUBJECT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]*$").unwrap());
static SESSION_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Cell\d+").unwrap());
static CELL_BASE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap());
static CELL_FULL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+_[A-Z]{4}$").unwrap());
static CELL_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{4}$").unwrap());

/// Subject identifiers are stored lower-case.
///
/// # Errors
/// Returns [`ParseError::UnparseableIdentifier`] for empty input or characters
/// outside `[a-z0-9_.-]`.
pub fn normalize_subject_id(raw: &str) -> Result<String> {
    let normalized = raw.trim().to_lowercase();

    if SUBJECT_ID_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ParseError::UnparseableIdentifier {
            kind: "subject",
            raw: raw.to_string(),
        })
    }
}

/// Upper-cases a cell identifier and appends `_<suffix>` when the suffix is
/// missing. Applying it to its own output is a no-op.
///
/// # Errors
/// Returns [`ParseError::UnparseableIdentifier`] when the identifier is
/// neither `BASE` nor `BASE_XXXX` with an alphanumeric base, or when `suffix`
/// is not four upper-case letters.
pub fn normalize_cell_id(raw: &str, suffix: &str) -> Result<String> {
    let unparseable = || ParseError::UnparseableIdentifier {
        kind: "cell",
        raw: raw.to_string(),
    };

    let normalized = raw.trim().to_uppercase();

    if CELL_FULL_REGEX.is_match(&normalized) {
        return Ok(normalized);
    }

    if !CELL_BASE_REGEX.is_match(&normalized) || !CELL_SUFFIX_REGEX.is_match(suffix) {
        return Err(unparseable());
    }

    Ok(format!("{normalized}_{suffix}"))
}

/// Extracts the `Cell<N>` token from a metadata file name.
///
/// # Errors
/// Returns [`ParseError::UnparseableIdentifier`] if the file name has no such
/// token.
pub fn session_id_from_file_name(file_name: &str) -> Result<String> {
    SESSION_ID_REGEX
        .find(file_name)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ParseError::UnparseableIdentifier {
            kind: "session",
            raw: file_name.to_string(),
        })
}

/// Whether a session datafile name embeds the given identifiers and the
/// session date (in either of the two date conventions). Comparison ignores
/// case.
#[must_use]
pub fn file_name_matches_session(
    file_name: &str,
    identifiers: &[&str],
    session_date: NaiveDate,
) -> bool {
    let file_name = file_name.to_lowercase();

    let has_identifiers = identifiers
        .iter()
        .all(|id| file_name.contains(&id.to_lowercase()));

    let has_date = [DATE_FORMAT_YMD, DATE_FORMAT_YDM]
        .iter()
        .any(|format| file_name.contains(&session_date.format(format).to_string()));

    has_identifiers && has_date
}
