use diesel::prelude::*;
use whiskerdb_core::model::virus::{NewVirus, NewVirusInjection};
use whiskerdb_schema::{virus, virus_injection};

use super::{Exists, FindId, impl_write};
use crate::db::error;

impl_write!(NewVirus, virus::table);

impl FindId for NewVirus {
    fn find_id(&self, db_conn: &mut SqliteConnection) -> error::Result<Option<i32>> {
        use virus::dsl::{id, lot_number, titer, virus_name, virus_source};

        // `is` so that two unknown titers compare equal
        let found = virus::table
            .filter(virus_source.eq(&self.virus_source))
            .filter(virus_name.eq(&self.virus_name))
            .filter(lot_number.eq(&self.lot_number))
            .filter(titer.is(self.titer))
            .select(id)
            .first(db_conn)
            .optional()?;

        Ok(found)
    }
}

impl Exists for NewVirus {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        Ok(self.find_id(db_conn)?.is_some())
    }
}

impl_write!(NewVirusInjection, virus_injection::table);

impl Exists for NewVirusInjection {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        use virus_injection::dsl::{
            action_location_id, injection_date, injection_depth, injection_volume, subject_id,
            virus_id,
        };

        let query = virus_injection::table
            .filter(subject_id.eq(&self.subject_id))
            .filter(virus_id.eq(self.virus_id))
            .filter(action_location_id.eq(self.action_location_id))
            .filter(injection_date.eq(self.injection_date))
            .filter(injection_depth.eq(self.injection_depth))
            .filter(injection_volume.eq(self.injection_volume));

        Ok(diesel::select(diesel::dsl::exists(query)).get_result(db_conn)?)
    }
}
