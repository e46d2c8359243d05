//! Single-column controlled vocabularies.

use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{animal_source, experiment_type, experimenter, species, strain};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = species, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewSpecies {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = strain, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewStrain {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = animal_source, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewAnimalSource {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = experimenter, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewExperimenter {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = experiment_type, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewExperimentType {
    pub name: String,
}
