use diesel::prelude::*;
use whiskerdb_core::model::location::{NewActionLocation, NewBrainLocation};
use whiskerdb_schema::{action_location, brain_location};

use super::{Exists, FindId, impl_exists_by_key, impl_write};
use crate::db::error;

impl_write!(NewBrainLocation, brain_location::table);
// The full name is descriptive only
impl_exists_by_key!(NewBrainLocation, brain_location::table, |row| (
    &row.brain_region,
    &row.brain_subregion,
    &row.cortical_layer,
    row.hemisphere
));

impl_write!(NewActionLocation, action_location::table);

impl FindId for NewActionLocation {
    fn find_id(&self, db_conn: &mut SqliteConnection) -> error::Result<Option<i32>> {
        use action_location::dsl::{
            brain_region, brain_subregion, coordinate_ap, coordinate_dv, coordinate_ml,
            coordinate_ref, cortical_layer, hemisphere, id,
        };

        let Self {
            brain_region: region,
            brain_subregion: subregion,
            cortical_layer: layer,
            hemisphere: side,
            coordinate_ref: reference,
            coordinate_ap: ap,
            coordinate_ml: ml,
            coordinate_dv: dv,
        } = self;

        let found = action_location::table
            .filter(brain_region.eq(region))
            .filter(brain_subregion.eq(subregion))
            .filter(cortical_layer.eq(layer))
            .filter(hemisphere.eq(side))
            .filter(coordinate_ref.eq(reference))
            .filter(coordinate_ap.eq(ap))
            .filter(coordinate_ml.eq(ml))
            .filter(coordinate_dv.eq(dv))
            .select(id)
            .first(db_conn)
            .optional()?;

        Ok(found)
    }
}

impl Exists for NewActionLocation {
    fn exists(&self, db_conn: &mut SqliteConnection) -> error::Result<bool> {
        Ok(self.find_id(db_conn)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use diesel::{QueryDsl, RunQueryDsl, SelectableHelper, SqliteConnection};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use whiskerdb_core::{
        location::{Coordinates, Hemisphere},
        model::location::{
            BrainLocationKey, CoordinateReference, NewActionLocation, NewBrainLocation,
        },
    };
    use whiskerdb_schema::{action_location, brain_location};

    use crate::db::{
        model::{EnsureId, Upsert, Written},
        test_util::db_conn,
    };

    fn alm() -> BrainLocationKey {
        BrainLocationKey {
            brain_region: "alm".to_string(),
            brain_subregion: "left".to_string(),
            cortical_layer: "5".to_string(),
            hemisphere: Hemisphere::Left,
        }
    }

    #[rstest]
    fn brain_locations_deduplicate_on_structure(mut db_conn: SqliteConnection) {
        let first = NewBrainLocation::new(alm(), "ALM, Layer 5, left");
        let renamed = NewBrainLocation::new(alm(), "anterior lateral motor cortex");

        assert_eq!(first.upsert(&mut db_conn).unwrap(), Written::Inserted);
        assert_eq!(renamed.upsert(&mut db_conn).unwrap(), Written::Skipped);

        let stored: Vec<NewBrainLocation> = brain_location::table
            .select(NewBrainLocation::as_select())
            .load(&mut db_conn)
            .unwrap();
        assert_eq!(stored, vec![first]);

        let right = NewBrainLocation::new(
            BrainLocationKey {
                hemisphere: Hemisphere::Right,
                ..alm()
            },
            "",
        );
        assert_eq!(right.upsert(&mut db_conn).unwrap(), Written::Inserted);
    }

    #[rstest]
    fn action_location_ids_are_stable(mut db_conn: SqliteConnection) {
        NewBrainLocation::new(alm(), "").upsert(&mut db_conn).unwrap();

        let coordinates = Coordinates {
            ap: 2.5,
            ml: 1.5,
            dv: 0.0,
        };
        let target = NewActionLocation::new(alm(), CoordinateReference::Bregma, coordinates);

        let id = target.ensure_id(&mut db_conn).unwrap();
        assert_eq!(target.ensure_id(&mut db_conn).unwrap(), id);

        let shifted = NewActionLocation::new(
            alm(),
            CoordinateReference::Bregma,
            Coordinates {
                dv: 0.8,
                ..coordinates
            },
        );
        assert_ne!(shifted.ensure_id(&mut db_conn).unwrap(), id);

        let n: i64 = action_location::table.count().get_result(&mut db_conn).unwrap();
        assert_eq!(n, 2);
    }
}
