use diesel::{dsl::exists, prelude::*};
use whiskerdb_core::model::{
    session::NewSession,
    trial::{NewTrial, NewTrialEvent, NewTrialSet, TrialSetWithTrials},
};
use whiskerdb_schema::{session, trial, trial_event, trial_set};

use super::{Exists, InsertMode, Write, Written, impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewTrialSet, trial_set::table);
impl_exists_by_key!(NewTrialSet, trial_set::table, |row| (
    &row.subject_id,
    &row.session_id
));

impl_write!(NewTrial, trial::table);
impl_write!(NewTrialEvent, trial_event::table);

impl Exists for TrialSetWithTrials {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        self.trial_set.exists(db_conn)
    }
}

impl Write for TrialSetWithTrials {
    fn write(&self, db_conn: &mut SqliteConnection, mode: InsertMode) -> error::Result<Written> {
        let Self { trial_set, trials } = self;

        db_conn.transaction(|db_conn| {
            let written = trial_set.write(db_conn, mode)?;
            if written == Written::Skipped {
                return Ok(written);
            }

            for trial in trials {
                trial.write(db_conn, InsertMode::FailOnDuplicate)?;
            }
            for event in self.events() {
                event.write(db_conn, InsertMode::FailOnDuplicate)?;
            }

            Ok(written)
        })
    }
}

/// Stored sessions with no trial set, ordered by key.
///
/// # Errors
pub fn sessions_without_trial_set(
    db_conn: &mut SqliteConnection,
) -> error::Result<Vec<NewSession>> {
    let sessions: Vec<NewSession> = session::table
        .select(NewSession::as_select())
        .order_by((session::subject_id, session::session_id))
        .load(db_conn)?;

    let mut pending = Vec::with_capacity(sessions.len());
    for s in sessions {
        let has_trial_set: bool = diesel::select(exists(
            trial_set::table.find((&s.subject_id, &s.session_id)),
        ))
        .get_result(db_conn)?;

        if !has_trial_set {
            pending.push(s);
        }
    }

    Ok(pending)
}
