use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Nm,
    #[default]
    #[serde(rename = "µm")]
    Mcm,
    Mm,
}

impl LengthUnit {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "nm" => Some(Self::Nm),
            "um" | "µm" | "μm" | "micron" | "microns" | "micrometer" | "micrometers" => {
                Some(Self::Mcm)
            }
            "mm" => Some(Self::Mm),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_micrometers(self, value: f64) -> f64 {
        let factor = match self {
            Self::Nm => 1e-3,
            Self::Mcm => 1.0,
            Self::Mm => 1e3,
        };

        value * factor
    }
}

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
pub enum TimeUnit {
    Millisecond,
    #[default]
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    /// Accepts singular or plural names in any case, e.g. `"Seconds"`.
    ///
    /// # Errors
    /// Returns [`ParseError::UnknownTimeUnit`] for anything else.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        let normalized = name.trim().to_lowercase();

        normalized
            .trim_end_matches('s')
            .parse()
            .map_err(|_| ParseError::UnknownTimeUnit {
                raw: name.to_string(),
            })
    }

    #[must_use]
    pub fn seconds(self) -> f64 {
        match self {
            Self::Millisecond => 1e-3,
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3600.0,
            Self::Day => 86400.0,
        }
    }

    #[must_use]
    pub fn to_seconds(self, value: f64) -> f64 {
        value * self.seconds()
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

    use super::TimeUnit;
    use crate::model::DbEnum;

    impl DbEnum for TimeUnit {}

    impl FromSql<Text, Sqlite> for TimeUnit {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for TimeUnit {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

/// Rounds to the two decimal places stored for depths, volumes and
/// coordinates.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
