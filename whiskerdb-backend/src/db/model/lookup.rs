use whiskerdb_core::model::lookup::{
    NewAnimalSource, NewExperimentType, NewExperimenter, NewSpecies, NewStrain,
};
use whiskerdb_schema::{animal_source, experiment_type, experimenter, species, strain};

use super::{impl_exists_by_key, impl_write};

impl_write!(NewSpecies, species::table);
impl_exists_by_key!(NewSpecies, species::table, |row| &row.name);

impl_write!(NewStrain, strain::table);
impl_exists_by_key!(NewStrain, strain::table, |row| &row.name);

impl_write!(NewAnimalSource, animal_source::table);
impl_exists_by_key!(NewAnimalSource, animal_source::table, |row| &row.name);

impl_write!(NewExperimenter, experimenter::table);
impl_exists_by_key!(NewExperimenter, experimenter::table, |row| &row.name);

impl_write!(NewExperimentType, experiment_type::table);
impl_exists_by_key!(NewExperimentType, experiment_type::table, |row| &row.name);

#[cfg(test)]
mod tests {
    use diesel::{QueryDsl, RunQueryDsl, SqliteConnection};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use whiskerdb_core::model::lookup::NewExperimenter;
    use whiskerdb_schema::experimenter;

    use crate::db::{
        error::Error,
        model::{Exists, InsertMode, Upsert, Write, Written},
        test_util::db_conn,
    };

    #[rstest]
    fn upsert_is_idempotent(mut db_conn: SqliteConnection) {
        let nuo = NewExperimenter {
            name: "Nuo Li".to_string(),
        };

        assert!(!nuo.exists(&mut db_conn).unwrap());
        assert_eq!(nuo.upsert(&mut db_conn).unwrap(), Written::Inserted);
        assert_eq!(nuo.upsert(&mut db_conn).unwrap(), Written::Skipped);

        let n: i64 = experimenter::table.count().get_result(&mut db_conn).unwrap();
        assert_eq!(n, 1);
    }

    #[rstest]
    fn insert_modes(mut db_conn: SqliteConnection) {
        let nuo = NewExperimenter {
            name: "Nuo Li".to_string(),
        };
        nuo.write(&mut db_conn, InsertMode::FailOnDuplicate).unwrap();

        assert_eq!(
            nuo.write(&mut db_conn, InsertMode::SkipOnDuplicate).unwrap(),
            Written::Skipped
        );
        assert!(matches!(
            nuo.write(&mut db_conn, InsertMode::FailOnDuplicate),
            Err(Error::DuplicateRecord { .. })
        ));
    }
}
