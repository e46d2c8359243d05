//! The trial and time-series pass over session datafiles.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use whiskerdb_core::{
    error::ParseError,
    identifier::file_name_matches_session,
    model::{
        acquisition::{NewAcquisitionSeries, SeriesKind, sampling_rate},
        session::NewSession,
        trial::{NewTrial, NewTrialSet, TrialSetWithTrials},
    },
    units::TimeUnit,
    value::Value,
    vocabulary::NOT_AVAILABLE,
};

use super::{AtStage, IngestContext, Reason, Skip, Stage};
use crate::{
    db::{
        error,
        model::{Upsert, Written, cell_ids},
    },
    decoder::Decoder,
};

const POLE_POSITION: (&str, usize) = ("polePos", 0);
const POLE_IN_TIME: (&str, usize) = ("poleInTime", 1);
const POLE_OUT_TIME: (&str, usize) = ("poleOutTime", 2);
const LICK_TIME: (&str, usize) = ("lickTime", 3);
const POLE_TRIAL_CONDITION: (&str, usize) = ("poleTrialCondition", 4);

/// First and last sample of a trial within a per-sample trial marker array.
///
/// Markers normally carry the trial id. Some files number trials by position
/// instead (`position + 1`), which is tried only when no marker equals the
/// id.
#[must_use]
#[allow(clippy::cast_precision_loss)]
fn align_trial(
    markers: &[Option<f64>],
    trial_id: i32,
    position: usize,
) -> Option<(usize, usize)> {
    let sample_range = |target: f64| {
        let mut samples = markers
            .iter()
            .enumerate()
            .filter(|(_, marker)| **marker == Some(target))
            .map(|(i, _)| i);

        let first = samples.next()?;
        Some((first, samples.last().unwrap_or(first)))
    };

    sample_range(f64::from(trial_id)).or_else(|| {
        let range = sample_range(position as f64 + 1.0);
        if range.is_some() {
            tracing::debug!(trial_id, position, "aligned trial by position");
        }
        range
    })
}

#[allow(clippy::cast_possible_truncation)]
fn to_i32(n: f64) -> Option<i32> {
    let in_range = n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX);
    in_range.then_some(n as i32)
}

fn unparseable(what: &str) -> ParseError {
    ParseError::UnparseableNumber {
        raw: what.to_string(),
    }
}

/// Time units are referenced by id throughout a datafile.
struct TimeUnits(BTreeMap<i32, TimeUnit>);

impl TimeUnits {
    fn from_value(data: &Value) -> Result<Self, Reason> {
        let ids = data.field("timeUnitIds").numbers();
        let names = data.field("timeUnitNames").texts();

        let mut units = BTreeMap::new();
        for (id, name) in ids.into_iter().zip(&names) {
            let id = id.and_then(to_i32).ok_or_else(|| unparseable("timeUnitIds"))?;
            units.insert(id, TimeUnit::from_name(name)?);
        }

        Ok(Self(units))
    }

    fn resolve(&self, id: &Value, field: &str) -> Result<TimeUnit, Reason> {
        let id = id
            .number()
            .ok_or_else(|| Reason::missing(field))?;

        to_i32(id)
            .and_then(|id| self.0.get(&id).copied())
            .ok_or_else(|| {
                ParseError::UnknownTimeUnit {
                    raw: id.to_string(),
                }
                .into()
            })
    }
}

struct SeriesArray {
    kind: SeriesKind,
    names: Vec<String>,
    ids: Vec<Option<f64>>,
    /// Seconds
    time: Vec<f64>,
    trial_markers: Vec<Option<f64>>,
    value_rows: Vec<Vec<Option<f64>>>,
}

impl SeriesArray {
    fn from_value(
        value: &Value,
        kind: SeriesKind,
        units: &TimeUnits,
    ) -> Result<Option<Self>, Reason> {
        if !value.has_struct() {
            return Ok(None);
        }

        let unit = units.resolve(value.field("timeUnit"), "timeSeriesArrayHash.timeUnit")?;

        Ok(Some(Self {
            kind,
            names: value.field("idStr").texts(),
            ids: value.field("id").numbers(),
            time: value
                .field("time")
                .numbers()
                .into_iter()
                .flatten()
                .map(|t| unit.to_seconds(t))
                .collect(),
            trial_markers: value.field("trial").numbers(),
            value_rows: value.field("valueMatrix").rows(),
        }))
    }

    /// One row per named channel. Channel ids are 1-based row numbers of the
    /// value matrix.
    fn series(&self, session: &NewSession) -> Result<Vec<NewAcquisitionSeries>, Reason> {
        let time_stamps = serde_json::to_string(&self.time).map_err(error::Error::from)?;
        let rate = sampling_rate(&self.time);

        let mut series = Vec::with_capacity(self.names.len());
        for (position, name) in self.names.iter().enumerate() {
            let row = self
                .ids
                .get(position)
                .copied()
                .flatten()
                .and_then(to_i32)
                .and_then(|id| usize::try_from(id - 1).ok())
                .unwrap_or(position);

            let Some(values) = self.value_rows.get(row) else {
                tracing::warn!(kind = %self.kind, series_type = %name, row, "no values for series");
                continue;
            };

            series.push(NewAcquisitionSeries {
                subject_id: session.subject_id.clone(),
                session_id: session.session_id.clone(),
                kind: self.kind,
                series_type: name.clone(),
                sampling_rate: rate,
                time_stamps: time_stamps.clone(),
                series_values: serde_json::to_string(values).map_err(error::Error::from)?,
            });
        }

        Ok(series)
    }
}

struct TrialProperties {
    pole_position: Vec<Option<f64>>,
    pole_in_time: Vec<Option<f64>>,
    pole_out_time: Vec<Option<f64>>,
    lick_times: Vec<Vec<f64>>,
    pole_trial_condition: Vec<Option<String>>,
}

impl TrialProperties {
    /// Properties are found by key name. Positions are used only when the
    /// hash carries no key names at all; a key missing from a named hash is
    /// absent.
    fn from_value(hash: &Value) -> Self {
        let key_names = hash.field("keyNames").texts();
        let values = hash.field("value");

        let property = |(key, fallback): (&str, usize)| {
            let index = if key_names.is_empty() {
                Some(fallback)
            } else {
                key_names.iter().position(|k| k == key)
            };

            if index.is_none() {
                tracing::debug!(key, "trial property not in datafile");
            }
            index.map(|i| values.element(i))
        };
        let numbers = |key| property(key).map(Value::numbers).unwrap_or_default();

        Self {
            pole_position: numbers(POLE_POSITION),
            pole_in_time: numbers(POLE_IN_TIME),
            pole_out_time: numbers(POLE_OUT_TIME),
            lick_times: property(LICK_TIME)
                .map(|v| {
                    v.items()
                        .iter()
                        .map(|trial| trial.numbers().into_iter().flatten().collect())
                        .collect()
                })
                .unwrap_or_default(),
            pole_trial_condition: property(POLE_TRIAL_CONDITION)
                .and_then(Value::unwrap_list)
                .unwrap_or_default()
                .into_iter()
                .map(|v| v.and_then(Value::text))
                .collect(),
        }
    }
}

/// The parts of a session datafile that are loaded.
struct SessionData {
    trial_time_unit: TimeUnit,
    trial_ids: Vec<i32>,
    trial_start_times: Vec<Option<f64>>,
    trial_type_rows: Vec<Vec<Option<f64>>>,
    trial_type_names: Vec<String>,
    properties: TrialProperties,
    behavior: Option<SeriesArray>,
    ephys: Option<SeriesArray>,
}

impl SessionData {
    fn from_value(root: &Value, root_name: &str) -> Result<Self, Reason> {
        let data = root.field(root_name);
        if !data.has_struct() {
            return Err(Reason::missing(root_name));
        }

        let units = TimeUnits::from_value(data)?;
        let trial_time_unit = units.resolve(data.field("trialTimeUnit"), "trialTimeUnit")?;

        let trial_ids = data
            .field("trialIds")
            .numbers()
            .into_iter()
            .map(|id| id.and_then(to_i32).ok_or_else(|| unparseable("trialIds")))
            .collect::<Result<_, _>>()?;

        let series_values = data.field("timeSeriesArrayHash").field("value");

        Ok(Self {
            trial_time_unit,
            trial_ids,
            trial_start_times: data.field("trialStartTimes").numbers(),
            trial_type_rows: data.field("trialTypeMat").rows(),
            trial_type_names: data.field("trialTypeStr").texts(),
            properties: TrialProperties::from_value(data.field("trialPropertiesHash")),
            behavior: SeriesArray::from_value(
                series_values.element(0),
                SeriesKind::Behavior,
                &units,
            )?,
            ephys: SeriesArray::from_value(series_values.element(1), SeriesKind::Ephys, &units)?,
        })
    }

    fn acquisition_series(
        &self,
        session: &NewSession,
    ) -> Result<Vec<NewAcquisitionSeries>, Reason> {
        let mut series = Vec::new();
        for array in [&self.behavior, &self.ephys].into_iter().flatten() {
            series.extend(array.series(session)?);
        }

        Ok(series)
    }

    /// The first trial type whose row of the type matrix marks this trial.
    fn trial_type(&self, position: usize) -> String {
        self.trial_type_rows
            .iter()
            .zip(&self.trial_type_names)
            .find(|(row, _)| row.get(position).copied().flatten() == Some(1.0))
            .map_or_else(|| NOT_AVAILABLE.to_string(), |(_, name)| name.clone())
    }

    fn trial_set(&self, session: &NewSession) -> Result<TrialSetWithTrials, Reason> {
        let unit = self.trial_time_unit;
        let start_time_at = |position: usize| {
            self.trial_start_times
                .get(position)
                .copied()
                .flatten()
                .map(|t| unit.to_seconds(t))
        };
        let markers = self
            .behavior
            .as_ref()
            .map_or(&[][..], |b| b.trial_markers.as_slice());

        let mut trials = Vec::with_capacity(self.trial_ids.len());
        for (position, &trial_idx) in self.trial_ids.iter().enumerate() {
            let start_time = start_time_at(position)
                .ok_or_else(|| Reason::missing(format!("trialStartTimes[{position}]")))?;

            let samples = align_trial(markers, trial_idx, position);
            let stop_time = samples
                .zip(self.behavior.as_ref())
                .and_then(|((_, last), behavior)| behavior.time.get(last).copied())
                .or_else(|| start_time_at(position + 1))
                .unwrap_or(start_time);

            let property = |values: &[Option<f64>]| values.get(position).copied().flatten();
            let sample = |i: usize| i32::try_from(i).ok();

            let lick_times: Vec<f64> = self
                .properties
                .lick_times
                .get(position)
                .map(|times| times.iter().map(|&t| unit.to_seconds(t)).collect())
                .unwrap_or_default();

            trials.push(NewTrial {
                subject_id: session.subject_id.clone(),
                session_id: session.session_id.clone(),
                trial_idx,
                trial_type: self.trial_type(position),
                pole_trial_condition: self
                    .properties
                    .pole_trial_condition
                    .get(position)
                    .cloned()
                    .flatten(),
                pole_position: property(&self.properties.pole_position),
                pole_in_time: property(&self.properties.pole_in_time)
                    .map(|t| unit.to_seconds(t)),
                pole_out_time: property(&self.properties.pole_out_time)
                    .map(|t| unit.to_seconds(t)),
                lick_time: serde_json::to_string(&lick_times).map_err(error::Error::from)?,
                start_time,
                stop_time,
                start_sample: samples.and_then(|(first, _)| sample(first)),
                end_sample: samples.and_then(|(_, last)| sample(last)),
            });
        }

        let number_of_trials = i32::try_from(trials.len()).map_err(|_| unparseable("trialIds"))?;

        Ok(TrialSetWithTrials {
            trial_set: NewTrialSet {
                subject_id: session.subject_id.clone(),
                session_id: session.session_id.clone(),
                number_of_trials,
                trial_time_unit: unit,
            },
            trials,
        })
    }
}

impl IngestContext {
    /// The first datafile, in name order, whose name carries the session's
    /// subject, session id, cell ids and date.
    pub(super) fn find_datafile<'a>(
        &mut self,
        datafiles: &'a [Utf8PathBuf],
        session: &NewSession,
    ) -> error::Result<Option<&'a Utf8Path>> {
        let cell_ids = cell_ids(&mut self.db_conn, &session.key())?;

        let mut identifiers = vec![session.subject_id.as_str(), session.session_id.as_str()];
        identifiers.extend(cell_ids.iter().map(String::as_str));

        let session_date = session.session_time.date();
        let mut matches = datafiles.iter().filter(|path| {
            path.file_name()
                .is_some_and(|name| file_name_matches_session(name, &identifiers, session_date))
        });

        let first = matches.next();
        if let Some(path) = first {
            let n_others = matches.count();
            if n_others > 0 {
                tracing::warn!(
                    session = %session.key(),
                    datafile = %path,
                    n_others,
                    "several datafiles match, using the first"
                );
            }
        }

        Ok(first.map(Utf8PathBuf::as_path))
    }

    pub(super) fn load_trials(
        &mut self,
        decoder: &impl Decoder,
        datafile: &Utf8Path,
        session: &NewSession,
    ) -> Result<(), Skip> {
        let root = decoder.decode(datafile).at(Stage::Decode)?;
        let data = SessionData::from_value(&root, &self.vocabularies.datafile_root)
            .at(Stage::Decode)?;

        let mut n_series = 0;
        for series in data.acquisition_series(session).at(Stage::Series)? {
            if series.upsert(&mut self.db_conn).at(Stage::Series)? == Written::Inserted {
                n_series += 1;
            }
        }

        let trial_set = data.trial_set(session).at(Stage::Trials)?;
        let written = trial_set
            .upsert(&mut self.db_conn)
            .map_err(Reason::from_transaction)
            .at(Stage::Trials)?;

        if written == Written::Inserted {
            tracing::info!(
                session = %session.key(),
                %datafile,
                n_trials = trial_set.trials.len(),
                n_series,
                "inserted trial set"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn markers(raw: &[f64]) -> Vec<Option<f64>> {
        raw.iter().copied().map(Some).collect()
    }

    #[rstest]
    #[case(&[7.0, 7.0, 8.0, 8.0, 8.0], 8, 1, Some((2, 4)))]
    #[case(&[7.0, 7.0, 8.0, 8.0, 8.0], 7, 0, Some((0, 1)))]
    #[case(&[1.0, 1.0, 2.0, 2.0, 2.0], 8, 1, Some((2, 4)))]
    #[case(&[1.0, 1.0, 2.0, 2.0, 2.0], 7, 0, Some((0, 1)))]
    #[case(&[1.0, 1.0], 9, 5, None)]
    #[case(&[], 1, 0, None)]
    fn trial_alignment(
        #[case] raw: &[f64],
        #[case] trial_id: i32,
        #[case] position: usize,
        #[case] expected: Option<(usize, usize)>,
    ) {
        assert_eq!(align_trial(&markers(raw), trial_id, position), expected);
    }

    #[test]
    fn literal_ids_take_precedence_over_positions() {
        // Trial 2 at position 0: position + 1 = 1 would also match
        let markers = markers(&[1.0, 2.0, 2.0, 1.0]);
        assert_eq!(align_trial(&markers, 2, 0), Some((1, 2)));
    }

    fn trial_properties(json: &str) -> TrialProperties {
        let hash = crate::decoder::JsonDecoder::decode_str(json).unwrap();
        TrialProperties::from_value(&hash)
    }

    #[test]
    fn properties_missing_from_named_hash_are_absent() {
        let properties = trial_properties(
            r#"{
                "keyNames": ["polePos", "poleInTime", "lickTime"],
                "value": [[10.5, 12.5], [1.5, 3.5], [[99.0, 99.5], 98.0]]
            }"#,
        );

        assert_eq!(properties.pole_position, vec![Some(10.5), Some(12.5)]);
        assert!(properties.pole_out_time.is_empty());
        assert!(properties.pole_trial_condition.is_empty());
        assert_eq!(properties.lick_times, vec![vec![99.0, 99.5], vec![98.0]]);
    }

    #[test]
    fn unnamed_hash_is_read_by_position() {
        let properties = trial_properties(
            r#"{
                "value": [[10.5, 12.5], [1.5, 3.5], [2.5, 4.0], [[1.6, 1.7], []], ["Go", "NoGo"]]
            }"#,
        );

        assert_eq!(properties.pole_in_time, vec![Some(1.5), Some(3.5)]);
        assert_eq!(properties.pole_out_time, vec![Some(2.5), Some(4.0)]);
        assert_eq!(properties.lick_times, vec![vec![1.6, 1.7], vec![]]);
        assert_eq!(
            properties.pole_trial_condition,
            vec![Some("Go".to_string()), Some("NoGo".to_string())]
        );
    }

    #[test]
    fn session_data_from_datafile() {
        let root = crate::decoder::JsonDecoder::decode_str(
            r#"{"c": {
                "timeUnitIds": [1, 2],
                "timeUnitNames": ["second", "millisecond"],
                "trialIds": [11, 12],
                "trialStartTimes": [1000, 3000],
                "trialTimeUnit": 2,
                "trialTypeMat": [[1, 0], [0, 1]],
                "trialTypeStr": ["Hit", "Miss"],
                "trialPropertiesHash": {
                    "keyNames": ["poleInTime", "polePos"],
                    "value": [[1500, 3200], [10.5, 12.5]]
                },
                "timeSeriesArrayHash": {"value": [{
                    "id": [1],
                    "idStr": ["thetaAtBase"],
                    "time": [1.0, 1.5, 2.0, 3.0, 3.5],
                    "timeUnit": 1,
                    "trial": [1, 1, 1, 2, 2],
                    "valueMatrix": [[0.1, 0.2, 0.3, 0.4, 0.5]]
                }]}
            }}"#,
        )
        .unwrap();

        let data = SessionData::from_value(&root, "c").unwrap();
        let session = crate::db::test_util::session("anm1", "Cell01");

        let series = data.acquisition_series(&session).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].series_type, "thetaAtBase");
        assert_eq!(series[0].series_values, "[0.1,0.2,0.3,0.4,0.5]");

        let trial_set = data.trial_set(&session).unwrap();
        assert_eq!(trial_set.trial_set.number_of_trials, 2);
        assert_eq!(trial_set.trial_set.trial_time_unit, TimeUnit::Millisecond);

        let summary: Vec<_> = trial_set
            .trials
            .iter()
            .map(|t| {
                (
                    t.trial_idx,
                    t.trial_type.as_str(),
                    t.start_sample,
                    t.end_sample,
                    t.pole_position,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (11, "Hit", Some(0), Some(2), Some(10.5)),
                (12, "Miss", Some(3), Some(4), Some(12.5))
            ]
        );

        let first = &trial_set.trials[0];
        assert!((first.start_time - 1.0).abs() < 1e-9);
        assert!((first.stop_time - 2.0).abs() < 1e-9);
        assert!((first.pole_in_time.unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(first.pole_out_time, None);
        assert_eq!(first.lick_time, "[]");
    }
}
