use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use whiskerdb_core::value::Value;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns an acquisition file into a value tree.
pub trait Decoder {
    /// Extension of the files this decoder understands, without the dot.
    fn extension(&self) -> &'static str;

    /// # Errors
    fn decode(&self, path: &Utf8Path) -> Result<Value, DecodeError>;
}

/// Reads JSON exports of acquisition files. Objects become structs, arrays
/// sequences, `null` is absent and booleans are `0` or `1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// # Errors
    pub fn decode_str(contents: &str) -> Result<Value, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_str(contents)?;

        Ok(to_value(json))
    }
}

impl Decoder for JsonDecoder {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn decode(&self, path: &Utf8Path) -> Result<Value, DecodeError> {
        let contents = fs::read_to_string(path).map_err(|source| DecodeError::Io {
            path: path.to_owned(),
            source,
        })?;

        Self::decode_str(&contents).map_err(|source| DecodeError::Json {
            path: path.to_owned(),
            source,
        })
    }
}

fn to_value(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Absent,
        Json::Bool(b) => Value::from(f64::from(u8::from(b))),
        Json::Number(n) => n.as_f64().map_or(Value::Absent, Value::from),
        Json::String(s) => Value::from(s),
        Json::Array(items) => Value::Sequence(items.into_iter().map(to_value).collect()),
        Json::Object(fields) => Value::structure(fields.into_iter().map(|(k, v)| (k, to_value(v)))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use whiskerdb_core::value::Value;

    use super::JsonDecoder;

    #[test]
    fn json_maps_onto_value_tree() {
        let decoded = JsonDecoder::decode_str(
            r#"{"meta_data": {"animal_ID": [["ANM244028"]], "cell": [], "ok": true, "depth": null}}"#,
        )
        .unwrap();

        let meta_data = decoded.field("meta_data");
        assert_eq!(meta_data.field("animal_ID").text().as_deref(), Some("ANM244028"));
        assert!(meta_data.field("cell").unwrap_one().is_none());
        assert_eq!(meta_data.field("ok").number(), Some(1.0));
        assert_eq!(meta_data.field("depth"), &Value::Absent);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(JsonDecoder::decode_str("{").is_err());
    }
}
