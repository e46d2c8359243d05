use diesel::SqliteConnection;

use super::error::{self, Error};

mod acquisition;
mod cell;
mod location;
mod lookup;
mod session;
mod stimulation;
mod subject;
mod trial;
mod virus;

pub use cell::cell_ids;
pub use subject::FillMissing;
pub use trial::sessions_without_trial_set;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    #[default]
    FailOnDuplicate,
    SkipOnDuplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    Inserted,
    Skipped,
}

impl Written {
    fn from_n_rows(n_rows: usize) -> Self {
        if n_rows == 0 {
            Self::Skipped
        } else {
            Self::Inserted
        }
    }
}

pub trait Exists {
    /// Whether a row with the same structural key is already stored.
    ///
    /// # Errors
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool>;
}

pub trait Write {
    /// # Errors
    /// With [`InsertMode::FailOnDuplicate`], a row with the same key fails
    /// with [`Error::DuplicateRecord`].
    fn write(&self, db_conn: &mut SqliteConnection, mode: InsertMode) -> error::Result<Written>;
}

pub trait Upsert: Exists + Write {
    /// Inserts the row unless it already exists. Existing rows are never
    /// modified.
    ///
    /// # Errors
    fn upsert(&self, db_conn: &mut SqliteConnection) -> error::Result<Written> {
        if self.exists(db_conn)? {
            return Ok(Written::Skipped);
        }

        self.write(db_conn, InsertMode::FailOnDuplicate)
    }
}

impl<T: Exists + Write> Upsert for T {}

/// Lookups identified in the store by a generated id rather than by their
/// fields.
pub trait FindId {
    /// # Errors
    fn find_id(&self, db_conn: &mut SqliteConnection) -> error::Result<Option<i32>>;
}

pub trait EnsureId: FindId + Write {
    /// The id of the stored row with these fields, inserting it first if
    /// needed.
    ///
    /// # Errors
    fn ensure_id(&self, db_conn: &mut SqliteConnection) -> error::Result<i32> {
        if let Some(id) = self.find_id(db_conn)? {
            return Ok(id);
        }

        self.write(db_conn, InsertMode::FailOnDuplicate)?;
        self.find_id(db_conn)?.ok_or(Error::RecordNotFound)
    }
}

impl<T: FindId + Write> EnsureId for T {}

macro_rules! impl_write {
    ($row:ty, $table:expr) => {
        impl $crate::db::model::Write for $row {
            fn write(
                &self,
                db_conn: &mut diesel::SqliteConnection,
                mode: $crate::db::model::InsertMode,
            ) -> $crate::db::error::Result<$crate::db::model::Written> {
                use diesel::RunQueryDsl;

                let n_rows = match mode {
                    $crate::db::model::InsertMode::FailOnDuplicate => {
                        diesel::insert_into($table).values(self).execute(db_conn)?
                    }
                    $crate::db::model::InsertMode::SkipOnDuplicate => {
                        diesel::insert_or_ignore_into($table)
                            .values(self)
                            .execute(db_conn)?
                    }
                };

                Ok($crate::db::model::Written::from_n_rows(n_rows))
            }
        }
    };
}
use impl_write;

macro_rules! impl_exists_by_key {
    ($row:ty, $table:expr, |$this:ident| $key:expr) => {
        impl $crate::db::model::Exists for $row {
            fn exists(
                &self,
                db_conn: &mut diesel::SqliteConnection,
            ) -> $crate::db::error::Result<bool> {
                use diesel::{QueryDsl, RunQueryDsl, dsl::exists};

                let $this = self;
                Ok(diesel::select(exists($table.find($key))).get_result(db_conn)?)
            }
        }
    };
}
use impl_exists_by_key;
