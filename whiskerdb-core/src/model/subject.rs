use chrono::NaiveDate;
use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::subject;

#[derive(
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
pub enum Sex {
    M,
    F,
    #[default]
    U,
}

impl Sex {
    /// The first character of the source text decides; anything else is
    /// unknown.
    #[must_use]
    pub fn from_source(raw: Option<&str>) -> Self {
        match raw.and_then(|r| r.trim().chars().next()) {
            Some('m' | 'M') => Self::M,
            Some('f' | 'F') => Self::F,
            _ => Self::U,
        }
    }
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

    use super::Sex;
    use crate::model::DbEnum;

    impl DbEnum for Sex {}

    impl FromSql<Text, Sqlite> for Sex {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for Sex {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = subject, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewSubject {
    pub subject_id: String,
    pub species: String,
    pub strain: String,
    pub animal_source: String,
    pub sex: Sex,
    pub date_of_birth: Option<NaiveDate>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::Sex;

    #[rstest]
    #[case(Some("male"), Sex::M)]
    #[case(Some("F"), Sex::F)]
    #[case(Some(" f "), Sex::F)]
    #[case(Some("unknown"), Sex::U)]
    #[case(Some(""), Sex::U)]
    #[case(None, Sex::U)]
    fn sex_from_source(#[case] raw: Option<&str>, #[case] expected: Sex) {
        assert_eq!(Sex::from_source(raw), expected);
    }
}
