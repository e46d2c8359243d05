use diesel::prelude::*;
use whiskerdb_core::model::subject::NewSubject;
use whiskerdb_schema::subject;

use super::{impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewSubject, subject::table);
impl_exists_by_key!(NewSubject, subject::table, |row| &row.subject_id);

pub trait FillMissing {
    /// Sets optional fields that are stored as null. Returns the number of
    /// fields filled; stored values are never replaced.
    ///
    /// # Errors
    fn fill_missing(&self, db_conn: &mut SqliteConnection) -> error::Result<usize>;
}

impl FillMissing for NewSubject {
    fn fill_missing(&self, db_conn: &mut SqliteConnection) -> error::Result<usize> {
        use subject::dsl::{date_of_birth, description};

        let stored = || subject::table.find(&self.subject_id);
        let mut n_filled = 0;

        if let Some(dob) = self.date_of_birth {
            n_filled += diesel::update(stored().filter(date_of_birth.is_null()))
                .set(date_of_birth.eq(dob))
                .execute(db_conn)?;
        }

        if let Some(text) = &self.description {
            n_filled += diesel::update(stored().filter(description.is_null()))
                .set(description.eq(text))
                .execute(db_conn)?;
        }

        Ok(n_filled)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use diesel::{QueryDsl, RunQueryDsl, SelectableHelper, SqliteConnection};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use whiskerdb_core::model::subject::NewSubject;
    use whiskerdb_schema::subject as subject_table;

    use super::FillMissing;
    use crate::db::{
        error::Error,
        model::{InsertMode, Upsert, Write, Written},
        test_util::{db_conn, subject},
    };

    #[rstest]
    fn existing_subject_only_gains_missing_fields(mut db_conn: SqliteConnection) {
        let db_conn = &mut db_conn;
        let first = subject("anm1");
        first.upsert(db_conn).unwrap();

        let mut second = subject("anm1");
        second.strain = "N/A".to_string();
        second.date_of_birth = NaiveDate::from_ymd_opt(2014, 6, 1);

        assert_eq!(second.upsert(db_conn).unwrap(), Written::Skipped);
        assert_eq!(second.fill_missing(db_conn).unwrap(), 1);
        assert_eq!(second.fill_missing(db_conn).unwrap(), 0);

        let stored: NewSubject = subject_table::table
            .find("anm1")
            .select(NewSubject::as_select())
            .first(db_conn)
            .unwrap();
        assert_eq!(
            stored,
            NewSubject {
                date_of_birth: NaiveDate::from_ymd_opt(2014, 6, 1),
                ..first
            }
        );
    }

    #[rstest]
    fn subject_requires_known_lookups(mut db_conn: SqliteConnection) {
        let mut unknown_strain = subject("anm1");
        unknown_strain.strain = "not seeded".to_string();

        assert!(matches!(
            unknown_strain.write(&mut db_conn, InsertMode::FailOnDuplicate),
            Err(Error::ReferenceNotFound { .. })
        ));
    }
}
