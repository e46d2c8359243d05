use chrono::NaiveDateTime;
use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{photostim_device, photostim_info, photostimulation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = photostim_device, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewPhotoStimDevice {
    pub name: String,
}

/// Stimulation parameters, deduplicated on the whole tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = photostim_info, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewPhotoStimInfo {
    pub action_location_id: i32,
    pub device_name: String,
    pub excitation_lambda: f64,
    pub stimulation_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = photostimulation, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewPhotoStimulation {
    pub subject_id: String,
    pub session_id: String,
    pub photostim_datetime: NaiveDateTime,
    pub photostim_info_id: i32,
}
