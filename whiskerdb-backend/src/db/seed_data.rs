use diesel::SqliteConnection;
use whiskerdb_core::model::lookup::{NewAnimalSource, NewSpecies, NewStrain};

use super::{error, model::Upsert};
use crate::config::Vocabularies;

/// Canonical vocabulary entries, including the `N/A` defaults, that
/// resolved subject fields may point at.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    species: Vec<NewSpecies>,
    strains: Vec<NewStrain>,
    animal_sources: Vec<NewAnimalSource>,
}

impl From<&Vocabularies> for SeedData {
    fn from(vocabularies: &Vocabularies) -> Self {
        let Vocabularies {
            default_species,
            animal_sources,
            strains,
            ..
        } = vocabularies;

        Self {
            species: vec![NewSpecies {
                name: default_species.clone(),
            }],
            strains: strains
                .canonical_entries()
                .into_iter()
                .map(|name| NewStrain {
                    name: name.to_string(),
                })
                .collect(),
            animal_sources: animal_sources
                .canonical_entries()
                .into_iter()
                .map(|name| NewAnimalSource {
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl SeedData {
    /// Safe to run on every start.
    ///
    /// # Errors
    pub fn write(&self, db_conn: &mut SqliteConnection) -> error::Result<()> {
        let Self {
            species,
            strains,
            animal_sources,
        } = self;

        for row in species {
            row.upsert(db_conn)?;
        }
        for row in strains {
            row.upsert(db_conn)?;
        }
        for row in animal_sources {
            row.upsert(db_conn)?;
        }

        tracing::debug!(
            n_species = species.len(),
            n_strains = strains.len(),
            n_animal_sources = animal_sources.len(),
            "seeded vocabularies"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use diesel::{QueryDsl, RunQueryDsl, SqliteConnection};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use whiskerdb_schema::{animal_source, strain};

    use super::SeedData;
    use crate::{config::Vocabularies, db::test_util::db_conn};

    #[rstest]
    fn seeding_twice_is_harmless(mut db_conn: SqliteConnection) {
        // The fixture has already seeded once
        SeedData::from(&Vocabularies::default())
            .write(&mut db_conn)
            .unwrap();

        let mut sources: Vec<String> = animal_source::table
            .select(animal_source::name)
            .load(&mut db_conn)
            .unwrap();
        sources.sort();
        assert_eq!(sources, vec!["Homemade", "JAX", "N/A"]);

        let n_strains: i64 = strain::table.count().get_result(&mut db_conn).unwrap();
        assert_eq!(n_strains, 2);
    }
}
