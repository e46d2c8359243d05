use diesel::prelude::*;
use whiskerdb_core::model::stimulation::{NewPhotoStimDevice, NewPhotoStimInfo, NewPhotoStimulation};
use whiskerdb_schema::{photostim_device, photostim_info, photostimulation};

use super::{Exists, FindId, impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewPhotoStimDevice, photostim_device::table);
impl_exists_by_key!(NewPhotoStimDevice, photostim_device::table, |row| &row.name);

impl_write!(NewPhotoStimInfo, photostim_info::table);

impl FindId for NewPhotoStimInfo {
    fn find_id(&self, db_conn: &mut SqliteConnection) -> error::Result<Option<i32>> {
        use photostim_info::dsl::{
            action_location_id, device_name, excitation_lambda, id, stimulation_method,
        };

        let found = photostim_info::table
            .filter(action_location_id.eq(self.action_location_id))
            .filter(device_name.eq(&self.device_name))
            .filter(excitation_lambda.eq(self.excitation_lambda))
            .filter(stimulation_method.eq(&self.stimulation_method))
            .select(id)
            .first(db_conn)
            .optional()?;

        Ok(found)
    }
}

impl Exists for NewPhotoStimInfo {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        Ok(self.find_id(db_conn)?.is_some())
    }
}

impl_write!(NewPhotoStimulation, photostimulation::table);
impl_exists_by_key!(NewPhotoStimulation, photostimulation::table, |row| (
    &row.subject_id,
    &row.session_id,
    row.photostim_datetime
));
