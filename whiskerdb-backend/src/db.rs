pub mod error;
pub mod model;
pub mod seed_data;
#[cfg(test)]
pub(crate) mod test_util;

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../db/migrations");

pub const IN_MEMORY: &str = ":memory:";

/// Opens the store at `database_path` with foreign keys enforced.
///
/// # Errors
/// Fails with [`error::Error::Connection`] if the database cannot be opened.
pub fn connect(database_path: &str) -> error::Result<SqliteConnection> {
    let mut db_conn = SqliteConnection::establish(database_path)?;
    db_conn.batch_execute("pragma foreign_keys = on;")?;

    Ok(db_conn)
}

/// # Errors
pub fn run_migrations(db_conn: &mut SqliteConnection) -> anyhow::Result<()> {
    db_conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("{e}"))?;

    Ok(())
}
