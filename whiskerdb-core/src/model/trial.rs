use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{trial, trial_event, trial_set};

use crate::units::TimeUnit;

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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrialEventType {
    #[default]
    TrialStart,
    TrialStop,
    PoleIn,
    PoleOut,
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

    use super::TrialEventType;
    use crate::model::DbEnum;

    impl DbEnum for TrialEventType {}

    impl FromSql<Text, Sqlite> for TrialEventType {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for TrialEventType {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = trial_set, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewTrialSet {
    pub subject_id: String,
    pub session_id: String,
    pub number_of_trials: i32,
    pub trial_time_unit: TimeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = trial, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewTrial {
    pub subject_id: String,
    pub session_id: String,
    pub trial_idx: i32,
    pub trial_type: String,
    pub pole_trial_condition: Option<String>,
    pub pole_position: Option<f64>,
    pub pole_in_time: Option<f64>,
    pub pole_out_time: Option<f64>,
    /// Session-clock seconds of each lick, as a JSON array
    pub lick_time: String,
    pub start_time: f64,
    pub stop_time: f64,
    pub start_sample: Option<i32>,
    pub end_sample: Option<i32>,
}

impl NewTrial {
    /// Event times relative to the start of the trial. Pole events are left
    /// out when the trial has no pole timing.
    #[must_use]
    pub fn events(&self) -> Vec<NewTrialEvent> {
        let event = |event_name, event_time| NewTrialEvent {
            subject_id: self.subject_id.clone(),
            session_id: self.session_id.clone(),
            trial_idx: self.trial_idx,
            event_name,
            event_time,
        };

        let mut events = vec![
            event(TrialEventType::TrialStart, 0.0),
            event(TrialEventType::TrialStop, self.stop_time - self.start_time),
        ];

        if let Some(t) = self.pole_in_time {
            events.push(event(TrialEventType::PoleIn, t - self.start_time));
        }
        if let Some(t) = self.pole_out_time {
            events.push(event(TrialEventType::PoleOut, t - self.start_time));
        }

        events
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = trial_event, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewTrialEvent {
    pub subject_id: String,
    pub session_id: String,
    pub trial_idx: i32,
    pub event_name: TrialEventType,
    pub event_time: f64,
}

/// A trial set with its trials. Written as a unit so that a session either
/// has a trial set with all its trials and events or has none of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSetWithTrials {
    pub trial_set: NewTrialSet,
    pub trials: Vec<NewTrial>,
}

impl TrialSetWithTrials {
    #[must_use]
    pub fn events(&self) -> Vec<NewTrialEvent> {
        self.trials.iter().flat_map(NewTrial::events).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn trial(pole_in_time: Option<f64>, pole_out_time: Option<f64>) -> NewTrial {
        NewTrial {
            subject_id: "anm244028".to_string(),
            session_id: "Cell01".to_string(),
            trial_idx: 3,
            trial_type: "Hit".to_string(),
            pole_trial_condition: None,
            pole_position: None,
            pole_in_time,
            pole_out_time,
            lick_time: "[]".to_string(),
            start_time: 10.0,
            stop_time: 14.5,
            start_sample: None,
            end_sample: None,
        }
    }

    #[test]
    fn events_are_relative_to_trial_start() {
        let events: Vec<_> = trial(Some(10.5), Some(12.0))
            .events()
            .into_iter()
            .map(|e| (e.event_name, e.event_time))
            .collect();

        assert_eq!(
            events,
            vec![
                (TrialEventType::TrialStart, 0.0),
                (TrialEventType::TrialStop, 4.5),
                (TrialEventType::PoleIn, 0.5),
                (TrialEventType::PoleOut, 2.0),
            ]
        );
    }

    #[test]
    fn pole_events_are_skipped_when_absent() {
        assert_eq!(trial(None, None).events().len(), 2);
        assert_eq!(TrialEventType::PoleOut.to_string(), "pole_out");
    }
}
