use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::acquisition_series;

#[derive(
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum SeriesKind {
    #[default]
    Behavior,
    Ephys,
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

    use super::SeriesKind;
    use crate::model::DbEnum;

    impl DbEnum for SeriesKind {}

    impl FromSql<Text, Sqlite> for SeriesKind {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for SeriesKind {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

/// One named channel of a session's behavioral or electrophysiology
/// recording. Timestamps are in seconds; both arrays are stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = acquisition_series, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewAcquisitionSeries {
    pub subject_id: String,
    pub session_id: String,
    pub kind: SeriesKind,
    pub series_type: String,
    pub sampling_rate: Option<f64>,
    pub time_stamps: String,
    pub series_values: String,
}

/// Samples per unit time over the span of `time_stamps`. `None` for fewer
/// than two samples or a zero span.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sampling_rate(time_stamps: &[f64]) -> Option<f64> {
    let (first, last) = (time_stamps.first()?, time_stamps.last()?);
    let span = last - first;

    (time_stamps.len() > 1 && span > 0.0).then(|| time_stamps.len() as f64 / span)
}

#[cfg(test)]
mod tests {
    use super::sampling_rate;

    #[test]
    fn sampling_rate_over_span() {
        let rate = sampling_rate(&[0.0, 0.5, 1.0, 1.5, 2.0]).unwrap();
        assert!((rate - 2.5).abs() < 1e-12);

        assert_eq!(sampling_rate(&[1.0]), None);
        assert_eq!(sampling_rate(&[]), None);
    }
}
