use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
use whiskerdb_schema::{action_location, brain_location};

use crate::{
    location::{Coordinates, Hemisphere, RecordingSite},
    vocabulary::NOT_AVAILABLE,
};

#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::expression::AsExpression, diesel::deserialize::FromSqlRow),
    diesel(sql_type = diesel::sql_types::Text)
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CoordinateReference {
    Lambda,
    #[default]
    Bregma,
}

#[cfg(feature = "backend")]
mod backend {
    use diesel::{
        backend::Backend,
        deserialize::FromSql,
        serialize::{Output, ToSql},
        sql_types::Text,
        sqlite::Sqlite,
    };

    use super::CoordinateReference;
    use crate::model::DbEnum;

    impl DbEnum for CoordinateReference {}

    impl FromSql<Text, Sqlite> for CoordinateReference {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for CoordinateReference {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

/// The structural identity of a brain location. Two locations with the same
/// key are the same row whatever their full names say.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BrainLocationKey {
    pub brain_region: String,
    pub brain_subregion: String,
    pub cortical_layer: String,
    pub hemisphere: Hemisphere,
}

impl BrainLocationKey {
    #[must_use]
    pub fn from_site(site: RecordingSite, hemisphere: Hemisphere) -> Self {
        Self {
            brain_region: site.brain_region,
            brain_subregion: site.brain_subregion,
            cortical_layer: site.cortical_layer,
            hemisphere,
        }
    }

    /// A whole-region location with no subregion or layer.
    #[must_use]
    pub fn region(brain_region: String, hemisphere: Hemisphere) -> Self {
        Self {
            brain_region,
            brain_subregion: NOT_AVAILABLE.to_string(),
            cortical_layer: NOT_AVAILABLE.to_string(),
            hemisphere,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = brain_location, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewBrainLocation {
    pub brain_region: String,
    pub brain_subregion: String,
    pub cortical_layer: String,
    pub hemisphere: Hemisphere,
    pub brain_location_full_name: String,
}

impl NewBrainLocation {
    #[must_use]
    pub fn new(key: BrainLocationKey, full_name: &str) -> Self {
        let BrainLocationKey {
            brain_region,
            brain_subregion,
            cortical_layer,
            hemisphere,
        } = key;

        Self {
            brain_region,
            brain_subregion,
            cortical_layer,
            hemisphere,
            brain_location_full_name: full_name.to_string(),
        }
    }

    #[must_use]
    pub fn key(&self) -> BrainLocationKey {
        BrainLocationKey {
            brain_region: self.brain_region.clone(),
            brain_subregion: self.brain_subregion.clone(),
            cortical_layer: self.cortical_layer.clone(),
            hemisphere: self.hemisphere,
        }
    }
}

/// A brain location together with stereotaxic coordinates, used as the
/// target of stimulations and injections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = action_location, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewActionLocation {
    pub brain_region: String,
    pub brain_subregion: String,
    pub cortical_layer: String,
    pub hemisphere: Hemisphere,
    pub coordinate_ref: CoordinateReference,
    pub coordinate_ap: f64,
    pub coordinate_ml: f64,
    pub coordinate_dv: f64,
}

impl NewActionLocation {
    #[must_use]
    pub fn new(
        key: BrainLocationKey,
        coordinate_ref: CoordinateReference,
        Coordinates { ap, ml, dv }: Coordinates,
    ) -> Self {
        Self {
            brain_region: key.brain_region,
            brain_subregion: key.brain_subregion,
            cortical_layer: key.cortical_layer,
            hemisphere: key.hemisphere,
            coordinate_ref,
            coordinate_ap: ap,
            coordinate_ml: ml,
            coordinate_dv: dv,
        }
    }
}
