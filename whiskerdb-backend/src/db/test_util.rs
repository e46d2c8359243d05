use chrono::NaiveDate;
use diesel::SqliteConnection;
use rstest::fixture;
use whiskerdb_core::model::{
    lookup::{NewExperimentType, NewExperimenter},
    session::NewSession,
    subject::{NewSubject, Sex},
};

use super::{IN_MEMORY, connect, model::Upsert, run_migrations, seed_data::SeedData};
use crate::config::Vocabularies;

#[fixture]
pub fn db_conn() -> SqliteConnection {
    let mut db_conn = connect(IN_MEMORY).unwrap();
    run_migrations(&mut db_conn).unwrap();
    SeedData::from(&Vocabularies::default())
        .write(&mut db_conn)
        .unwrap();

    db_conn
}

/// Seeded store holding subject `anm1`, experimenter `Nuo Li` and the
/// `behavior` and `extracellular` experiment types.
#[fixture]
pub fn db_conn_with_subject(mut db_conn: SqliteConnection) -> SqliteConnection {
    subject("anm1").upsert(&mut db_conn).unwrap();
    NewExperimenter {
        name: "Nuo Li".to_string(),
    }
    .upsert(&mut db_conn)
    .unwrap();

    for name in ["behavior", "extracellular"] {
        NewExperimentType {
            name: name.to_string(),
        }
        .upsert(&mut db_conn)
        .unwrap();
    }

    db_conn
}

pub fn subject(subject_id: &str) -> NewSubject {
    NewSubject {
        subject_id: subject_id.to_string(),
        species: "Mus musculus".to_string(),
        strain: "000664".to_string(),
        animal_source: "JAX".to_string(),
        sex: Sex::M,
        date_of_birth: None,
        description: None,
    }
}

pub fn session(subject_id: &str, session_id: &str) -> NewSession {
    NewSession {
        subject_id: subject_id.to_string(),
        session_id: session_id.to_string(),
        session_time: NaiveDate::from_ymd_opt(2014, 10, 21)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        session_directory: String::new(),
        session_note: String::new(),
    }
}
