pub mod acquisition;
pub mod cell;
pub mod location;
pub mod lookup;
pub mod session;
pub mod stimulation;
pub mod subject;
pub mod trial;
pub mod virus;

#[cfg(feature = "backend")]
pub(crate) use backend::DbEnum;

#[cfg(feature = "backend")]
mod backend {
    use std::str::FromStr;

    use diesel::{
        backend::Backend,
        deserialize::FromSql,
        serialize::{Output, ToSql},
        sql_types,
        sqlite::Sqlite,
    };

    pub(crate) trait DbEnum: FromStr + Into<&'static str> + Copy + Default {
        fn from_sql_inner(
            bytes: <Sqlite as Backend>::RawValue<'_>,
        ) -> diesel::deserialize::Result<Self> {
            let raw: String = FromSql::<sql_types::Text, Sqlite>::from_sql(bytes)?;

            Ok(Self::from_str(&raw).unwrap_or_default())
        }

        fn to_sql_inner<'b>(self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            let as_str: &'static str = self.into();

            ToSql::<sql_types::Text, Sqlite>::to_sql(as_str, out)
        }
    }
}
