use diesel::prelude::*;
use whiskerdb_core::model::{
    cell::{NewCell, NewDevice},
    session::SessionKey,
};
use whiskerdb_schema::{cell, device};

use super::{impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewDevice, device::table);
impl_exists_by_key!(NewDevice, device::table, |row| &row.name);

impl_write!(NewCell, cell::table);
impl_exists_by_key!(NewCell, cell::table, |row| (
    &row.subject_id,
    &row.session_id,
    &row.cell_id
));

/// Identifiers of the cells recorded in a session, in order.
///
/// # Errors
pub fn cell_ids(
    db_conn: &mut SqliteConnection,
    session: &SessionKey,
) -> error::Result<Vec<String>> {
    let ids = cell::table
        .filter(cell::subject_id.eq(&session.subject_id))
        .filter(cell::session_id.eq(&session.session_id))
        .select(cell::cell_id)
        .order_by(cell::cell_id)
        .load(db_conn)?;

    Ok(ids)
}
