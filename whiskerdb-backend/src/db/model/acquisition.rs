use whiskerdb_core::model::acquisition::NewAcquisitionSeries;
use whiskerdb_schema::acquisition_series;

use super::{impl_exists_by_key, impl_write};

impl_write!(NewAcquisitionSeries, acquisition_series::table);
impl_exists_by_key!(NewAcquisitionSeries, acquisition_series::table, |row| (
    &row.subject_id,
    &row.session_id,
    row.kind,
    &row.series_type
));
