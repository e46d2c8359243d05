use diesel::{Connection, SqliteConnection};
use whiskerdb_core::model::session::{
    NewSession, NewSessionExperimentType, NewSessionExperimenter, SessionWithChildren,
};
use whiskerdb_schema::{session, session_experiment_type, session_experimenter};

use super::{Exists, InsertMode, Write, Written, impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewSession, session::table);
impl_exists_by_key!(NewSession, session::table, |row| (
    &row.subject_id,
    &row.session_id
));

impl_write!(NewSessionExperimenter, session_experimenter::table);
impl_write!(NewSessionExperimentType, session_experiment_type::table);

impl Exists for SessionWithChildren {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        self.session.exists(db_conn)
    }
}

impl Write for SessionWithChildren {
    /// The session and its association rows are committed together. If the
    /// session is skipped as a duplicate its associations are left alone.
    fn write(&self, db_conn: &mut SqliteConnection, mode: InsertMode) -> error::Result<Written> {
        let Self {
            session,
            experimenters,
            experiment_types,
        } = self;

        db_conn.transaction(|db_conn| {
            let written = session.write(db_conn, mode)?;
            if written == Written::Skipped {
                return Ok(written);
            }

            for experimenter in experimenters {
                experimenter.write(db_conn, InsertMode::FailOnDuplicate)?;
            }
            for experiment_type in experiment_types {
                experiment_type.write(db_conn, InsertMode::FailOnDuplicate)?;
            }

            tracing::debug!(session = %session.key(), "wrote session with associations");

            Ok(written)
        })
    }
}
