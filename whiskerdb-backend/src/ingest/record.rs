//! Typed views over a decoded metadata file. Everything here is read with
//! the unwrapping helpers of [`Value`], so an empty field at any nesting depth
//! surfaces as `None`.

use whiskerdb_core::value::Value;

use super::Reason;

#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct MetadataRecord {
    pub animal_id: String,
    pub sex: Option<String>,
    pub species: Option<String>,
    pub animal_background: Option<String>,
    pub date_of_birth: Option<String>,
    pub source_strain: Option<String>,
    pub source_identifier: Option<String>,
    pub date_of_experiment: String,
    pub experimenters: Vec<String>,
    pub experiment_types: Vec<String>,
    pub cell: Option<String>,
    pub extracellular: Option<Extracellular>,
    pub photostim: Option<Photostim>,
    pub virus: Option<Virus>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct Extracellular {
    pub atlas_location: Option<String>,
    pub recording_location: Option<String>,
    pub recording_depth: Option<String>,
    pub device_label: Option<String>,
    pub cell_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct Photostim {
    pub atlas_location: Option<String>,
    pub coord_location: Option<String>,
    pub lambda: Option<String>,
    pub stimulation_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct Virus {
    pub source: Option<String>,
    pub name: Option<String>,
    pub lot_number: Option<String>,
    pub titer: Option<String>,
    pub atlas_location: Option<String>,
    pub coord_location: Option<String>,
    pub injection_date: Option<String>,
    pub depths: Vec<Option<String>>,
    pub volumes: Vec<Option<String>>,
}

/// Like [`Value::texts`], but empty elements keep their position.
fn positional_texts(value: &Value) -> Vec<Option<String>> {
    value
        .unwrap_list()
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.and_then(Value::text))
        .collect()
}

impl MetadataRecord {
    /// Reads the struct stored under `root_name`.
    ///
    /// # Errors
    /// [`Reason::MissingValue`] if the root struct, the animal identifier or
    /// the date of experiment is absent. Every other field is optional here.
    pub fn from_value(root: &Value, root_name: &str) -> Result<Self, Reason> {
        let meta_data = root.field(root_name);
        if !meta_data.has_struct() {
            return Err(Reason::missing(root_name));
        }

        let text = |name: &str| meta_data.field(name).text();

        let required = |name: &str| text(name).ok_or_else(|| Reason::missing(name));

        let animal_id = required("animal_ID")?;
        let date_of_experiment = required("date_of_experiment")?;

        Ok(Self {
            animal_id,
            sex: text("sex"),
            species: text("species"),
            animal_background: text("animal_background"),
            // sic, as named in the acquisition files
            date_of_birth: text("data_of_birth"),
            source_strain: text("source_strain"),
            source_identifier: text("source_identifier"),
            date_of_experiment,
            experimenters: meta_data.field("experimenters").texts(),
            experiment_types: meta_data.field("experiment_type").texts(),
            cell: text("cell"),
            extracellular: Extracellular::from_value(meta_data.field("extracellular")),
            photostim: Photostim::from_value(meta_data.field("photostim")),
            virus: Virus::from_value(meta_data.field("virus")),
        })
    }
}

impl Extracellular {
    fn from_value(value: &Value) -> Option<Self> {
        if !value.has_struct() {
            return None;
        }

        let recording = value.field("recording_coord_location");

        Some(Self {
            atlas_location: value.field("atlas_location").text(),
            recording_location: recording.element(0).text(),
            recording_depth: recording.element(1).text(),
            device_label: value.field("probe_type").text(),
            cell_type: value.field("cell_type").text(),
        })
    }
}

impl Photostim {
    fn from_value(value: &Value) -> Option<Self> {
        if !value.has_struct() {
            return None;
        }

        Some(Self {
            atlas_location: value.field("photostim_atlas_location").text(),
            coord_location: value.field("photostim_coord_location").text(),
            lambda: value.field("lambda").text(),
            stimulation_method: value.field("stimulation_method").text(),
        })
    }
}

impl Virus {
    fn from_value(value: &Value) -> Option<Self> {
        if !value.has_struct() {
            return None;
        }

        let text = |name: &str| value.field(name).text();

        Some(Self {
            source: text("virus_source"),
            name: text("virus_name"),
            lot_number: text("virus_lot_number"),
            titer: text("titer"),
            atlas_location: text("atlas_location"),
            coord_location: text("virus_coord_location"),
            injection_date: text("injection_date"),
            depths: positional_texts(value.field("depth")),
            volumes: positional_texts(value.field("volume")),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::decoder::JsonDecoder;

    #[test]
    fn reads_nested_metadata() {
        let root = JsonDecoder::decode_str(
            r#"{
                "meta_data": [[{
                    "animal_ID": [["ANM244028"]],
                    "sex": "Male",
                    "date_of_experiment": [[141021]],
                    "experimenters": "Nuo Li",
                    "experiment_type": [["behavior"], ["extracellular"]],
                    "data_of_birth": [],
                    "cell": "JY1243",
                    "extracellular": {
                        "atlas_location": "left ALM",
                        "recording_coord_location": [["ALM, Layer 5, left"], ["350 um"]],
                        "probe_type": "Axopatch 200B, glass pipette",
                        "cell_type": "pyramidal"
                    },
                    "photostim": [],
                    "virus": {
                        "virus_name": "AAV2/1-hSyn-hChR2",
                        "depth": ["300 um", [], "600 um"],
                        "volume": ["20 nl", "20 nl", "20 nl"]
                    }
                }]]
            }"#,
        )
        .unwrap();

        let record = MetadataRecord::from_value(&root, "meta_data").unwrap();

        assert_eq!(record.animal_id, "ANM244028");
        assert_eq!(record.date_of_experiment, "141021");
        assert_eq!(record.date_of_birth, None);
        assert_eq!(record.experimenters, vec!["Nuo Li"]);
        assert_eq!(record.experiment_types, vec!["behavior", "extracellular"]);
        assert_eq!(record.photostim, None);

        let extracellular = record.extracellular.unwrap();
        assert_eq!(
            extracellular.recording_location.as_deref(),
            Some("ALM, Layer 5, left")
        );
        assert_eq!(extracellular.recording_depth.as_deref(), Some("350 um"));

        let virus = record.virus.unwrap();
        assert_eq!(
            virus.depths,
            vec![Some("300 um".to_string()), None, Some("600 um".to_string())]
        );
        assert_eq!(virus.volumes.len(), 3);
    }

    #[rstest]
    #[case(r#"{"meta_data": {"animal_ID": [], "date_of_experiment": "141021"}}"#, "animal_ID")]
    #[case(
        r#"{"meta_data": {"animal_ID": "ANM1", "date_of_experiment": [[]]}}"#,
        "date_of_experiment"
    )]
    #[case(r#"{"meta_data": {"animal_ID": "ANM1"}}"#, "date_of_experiment")]
    fn required_fields(#[case] json: &str, #[case] missing: &str) {
        let root = JsonDecoder::decode_str(json).unwrap();

        assert!(matches!(
            MetadataRecord::from_value(&root, "meta_data"),
            Err(Reason::MissingValue(field)) if field == missing
        ));
    }

    #[test]
    fn root_struct_is_required() {
        let root = JsonDecoder::decode_str(r#"{"other": {}}"#).unwrap();
        assert!(matches!(
            MetadataRecord::from_value(&root, "meta_data"),
            Err(Reason::MissingValue(field)) if field == "meta_data"
        ));
    }
}
