use std::sync::LazyLock;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use regex::Regex;
use serde::Serialize;

// SQLite reports e.g. "UNIQUE constraint failed: subject.subject_id"
static CONSTRAINT_DETAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"constraint failed: (\w+)\.(.+)").unwrap());

#[derive(thiserror::Error, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Error {
    #[error("{entity} with {} already exists", detail.clone().unwrap_or_default())]
    DuplicateRecord {
        entity: String,
        detail: Option<String>,
    },
    #[error("{entity} references a record that does not exist")]
    ReferenceNotFound {
        entity: String,
        detail: Option<String>,
    },
    #[error("record not found")]
    RecordNotFound,
    #[error("store connection failed: {message}")]
    Connection { message: String },
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    fn from_other_error(err: impl std::error::Error) -> Self {
        Self::Other {
            message: format!("{err:?}"),
        }
    }

    /// Whether the store itself is unusable, as opposed to a single write
    /// having been rejected.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error::{BrokenTransactionManager, DatabaseError, NotFound};
        match err {
            DatabaseError(kind, info) => Self::from((kind, info)),
            NotFound => Self::RecordNotFound,
            BrokenTransactionManager => Self::Connection {
                message: err.to_string(),
            },
            _ => Self::from_other_error(err),
        }
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::Connection {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::from_other_error(err)
    }
}

impl
    From<(
        DatabaseErrorKind,
        Box<dyn DatabaseErrorInformation + Send + Sync>,
    )> for Error
{
    fn from(
        (kind, info): (
            DatabaseErrorKind,
            Box<dyn DatabaseErrorInformation + Send + Sync>,
        ),
    ) -> Self {
        use DatabaseErrorKind::{
            ClosedConnection, ForeignKeyViolation, UnableToSendCommand, UniqueViolation,
        };

        let captures = CONSTRAINT_DETAIL_REGEX.captures(info.message());
        let capture = |i| captures.as_ref().and_then(|c| c.get(i)).map(|m| m.as_str().to_string());

        let entity = info
            .table_name()
            .map(str::to_string)
            .or_else(|| capture(1))
            .unwrap_or_default();
        let detail = capture(2);

        match kind {
            UniqueViolation => Self::DuplicateRecord { entity, detail },
            ForeignKeyViolation => Self::ReferenceNotFound { entity, detail },
            ClosedConnection | UnableToSendCommand => Self::Connection {
                message: info.message().to_string(),
            },
            _ => Self::from_other_error(diesel::result::Error::DatabaseError(kind, info)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use pretty_assertions::assert_eq;

    use super::Error;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> Error {
        DieselError::DatabaseError(kind, Box::new(message.to_string())).into()
    }

    #[test]
    fn unique_violation_names_the_entity() {
        assert_eq!(
            database_error(
                DatabaseErrorKind::UniqueViolation,
                "UNIQUE constraint failed: subject.subject_id"
            ),
            Error::DuplicateRecord {
                entity: "subject".to_string(),
                detail: Some("subject_id".to_string())
            }
        );
    }

    #[test]
    fn connection_errors_are_fatal() {
        assert!(database_error(DatabaseErrorKind::ClosedConnection, "closed").is_fatal());
        assert!(
            !database_error(DatabaseErrorKind::ForeignKeyViolation, "FOREIGN KEY constraint failed")
                .is_fatal()
        );
        assert!(!Error::RecordNotFound.is_fatal());
    }
}
