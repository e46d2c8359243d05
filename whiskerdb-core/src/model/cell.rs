use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{cell, device};

use crate::location::Hemisphere;

const DEVICE_NAME_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = device, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewDevice {
    pub name: String,
    pub description: String,
}

impl NewDevice {
    /// The device name is the device label up to its first `", "`; the whole
    /// device label is kept as the description.
    #[must_use]
    pub fn from_device_label(label: &str) -> Self {
        let label = label.trim();
        let name = label
            .split(DEVICE_NAME_SEPARATOR)
            .next()
            .unwrap_or(label);

        Self {
            name: name.to_string(),
            description: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = cell, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewCell {
    pub subject_id: String,
    pub session_id: String,
    pub cell_id: String,
    pub cell_type: String,
    pub device_name: String,
    pub brain_region: String,
    pub brain_subregion: String,
    pub cortical_layer: String,
    pub hemisphere: Hemisphere,
    pub recording_depth: Option<f64>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::NewDevice;

    #[test]
    fn device_from_label() {
        assert_eq!(
            NewDevice::from_device_label("Axopatch 200B, glass pipette"),
            NewDevice {
                name: "Axopatch 200B".to_string(),
                description: "Axopatch 200B, glass pipette".to_string()
            }
        );
        assert_eq!(NewDevice::from_device_label("juxta").name, "juxta");
    }
}
