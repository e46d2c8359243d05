use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{session, session_experiment_type, session_experimenter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionKey {
    pub subject_id: String,
    pub session_id: String,
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject_id, self.session_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = session, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewSession {
    pub subject_id: String,
    pub session_id: String,
    pub session_time: NaiveDateTime,
    pub session_directory: String,
    pub session_note: String,
}

impl NewSession {
    #[must_use]
    pub fn key(&self) -> SessionKey {
        SessionKey {
            subject_id: self.subject_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = session_experimenter, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewSessionExperimenter {
    pub subject_id: String,
    pub session_id: String,
    pub experimenter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = session_experiment_type, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewSessionExperimentType {
    pub subject_id: String,
    pub session_id: String,
    pub experiment_type: String,
}

/// A session with the association rows that must be written with it.
/// Repeated experimenters or experiment types are collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionWithChildren {
    pub session: NewSession,
    pub experimenters: Vec<NewSessionExperimenter>,
    pub experiment_types: Vec<NewSessionExperimentType>,
}

impl SessionWithChildren {
    #[must_use]
    pub fn new(session: NewSession, experimenters: &[String], experiment_types: &[String]) -> Self {
        let experimenters = experimenters
            .iter()
            .unique()
            .map(|e| NewSessionExperimenter {
                subject_id: session.subject_id.clone(),
                session_id: session.session_id.clone(),
                experimenter: e.clone(),
            })
            .collect();

        let experiment_types = experiment_types
            .iter()
            .unique()
            .map(|t| NewSessionExperimentType {
                subject_id: session.subject_id.clone(),
                session_id: session.session_id.clone(),
                experiment_type: t.clone(),
            })
            .collect();

        Self {
            session,
            experimenters,
            experiment_types,
        }
    }
}
