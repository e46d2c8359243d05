//! Extraction of structured brain locations from the free-text descriptions
//! found in acquisition metadata, e.g. `"ALM, Layer 5, left"` or
//! `"350 um from pia"`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ParseError, Result},
    units::{LengthUnit, round2},
    vocabulary::NOT_AVAILABLE,
};

static TOKEN_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*|\s+").unwrap());
static NUMBER_WITH_UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([A-Za-zµμ]+)?").unwrap());
static DECIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+\.\d+").unwrap());

const LAYER_MARKER: &str = "layer";
const MIN_POSITIONAL_TOKENS: usize = 3;

#[derive(
    Deserialize,
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
pub enum Hemisphere {
    #[default]
    Left,
    Right,
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

    use super::Hemisphere;
    use crate::model::DbEnum;

    impl DbEnum for Hemisphere {}

    impl FromSql<Text, Sqlite> for Hemisphere {
        fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> diesel::deserialize::Result<Self> {
            Self::from_sql_inner(bytes)
        }
    }

    impl ToSql<Text, Sqlite> for Hemisphere {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
            self.to_sql_inner(out)
        }
    }
}

/// Region, layer and subregion of a recording site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSite {
    pub brain_region: String,
    pub cortical_layer: String,
    pub brain_subregion: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub ap: f64,
    pub ml: f64,
    pub dv: f64,
}

#[must_use]
pub fn tokenize(description: &str) -> Vec<&str> {
    TOKEN_SEPARATOR_REGEX
        .split(description.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

fn unparseable(raw: &str, reason: &'static str) -> ParseError {
    ParseError::UnparseableLocation {
        raw: raw.to_string(),
        reason,
    }
}

/// Splits on commas and whitespace. With a `Layer` marker, the token before
/// it is the region, the one after it the layer and the next one the
/// subregion (`N/A` when missing). Without the marker at least three tokens
/// are required and are read positionally as region, layer, subregion.
///
/// # Errors
/// Returns [`ParseError::UnparseableLocation`] when neither form applies.
pub fn parse_recording_location(description: &str) -> Result<RecordingSite> {
    let tokens = tokenize(description);
    let lower = |t: &str| t.to_lowercase();

    let marker = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case(LAYER_MARKER));

    let (region, layer, subregion) = match marker {
        Some(0) => return Err(unparseable(description, "no region before layer marker")),
        Some(i) => {
            let layer = tokens
                .get(i + 1)
                .ok_or_else(|| unparseable(description, "no value after layer marker"))?;

            (tokens[0], *layer, tokens.get(i + 2).copied())
        }
        None if tokens.len() >= MIN_POSITIONAL_TOKENS => (tokens[0], tokens[1], Some(tokens[2])),
        None => {
            return Err(unparseable(
                description,
                "no layer marker and too few tokens",
            ));
        }
    };

    Ok(RecordingSite {
        brain_region: lower(region),
        cortical_layer: lower(layer),
        brain_subregion: subregion.map_or_else(|| NOT_AVAILABLE.to_string(), lower),
    })
}

/// The region named by an atlas description such as `"left ALM"`: the second
/// token, or the only token when there is just one.
///
/// # Errors
/// Returns [`ParseError::UnparseableLocation`] for an empty description.
pub fn atlas_region(description: &str) -> Result<String> {
    let tokens = tokenize(description);

    tokens
        .get(1)
        .or(tokens.first())
        .map(|t| t.to_lowercase())
        .ok_or_else(|| unparseable(description, "empty atlas location"))
}

/// The first token of a description, lower-cased.
///
/// # Errors
/// Returns [`ParseError::UnparseableLocation`] for an empty description.
pub fn leading_region(description: &str) -> Result<String> {
    tokenize(description)
        .first()
        .map(|t| t.to_lowercase())
        .ok_or_else(|| unparseable(description, "empty atlas location"))
}

/// The first number in `description`.
///
/// # Errors
/// Returns [`ParseError::UnparseableNumber`] if there is none.
pub fn leading_number(description: &str) -> Result<f64> {
    NUMBER_WITH_UNIT_REGEX
        .captures(description)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ParseError::UnparseableNumber {
            raw: description.to_string(),
        })
}

/// Depth in micrometres from the first number in `description`. A unit
/// directly after the number is converted; anything else is taken as
/// micrometres. `None` when there is no number.
#[must_use]
pub fn parse_depth(description: &str) -> Option<f64> {
    let captures = NUMBER_WITH_UNIT_REGEX.captures(description)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;

    let unit = captures
        .get(2)
        .and_then(|m| LengthUnit::from_token(m.as_str()))
        .unwrap_or_default();

    Some(round2(unit.to_micrometers(value)))
}

/// Anterior-posterior and medial-lateral coordinates are the first two
/// decimal numbers; dorsal-ventral is the third, or zero.
///
/// # Errors
/// Returns [`ParseError::UnparseableLocation`] when fewer than two decimals
/// are present.
pub fn parse_coordinates(description: &str) -> Result<Coordinates> {
    let numbers: Vec<f64> = DECIMAL_REGEX
        .find_iter(description)
        .filter_map(|m| m.as_str().parse().ok())
        .map(round2)
        .collect();

    match numbers.as_slice() {
        [ap, ml] => Ok(Coordinates {
            ap: *ap,
            ml: *ml,
            dv: 0.0,
        }),
        [ap, ml, dv, ..] => Ok(Coordinates {
            ap: *ap,
            ml: *ml,
            dv: *dv,
        }),
        _ => Err(unparseable(description, "expected at least two coordinates")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn site(region: &str, layer: &str, subregion: &str) -> RecordingSite {
        RecordingSite {
            brain_region: region.to_string(),
            cortical_layer: layer.to_string(),
            brain_subregion: subregion.to_string(),
        }
    }

    #[rstest]
    #[case("ALM, Layer 5, left", site("alm", "5", "left"))]
    #[case("vS1 layer 4 C2", site("vs1", "4", "c2"))]
    #[case("vS1, Layer 2/3", site("vs1", "2/3", "N/A"))]
    #[case("vS1, L4, C2", site("vs1", "l4", "c2"))]
    fn recording_locations(#[case] description: &str, #[case] expected: RecordingSite) {
        assert_eq!(parse_recording_location(description).unwrap(), expected);
    }

    #[rstest]
    #[case("ALM, left")]
    #[case("")]
    #[case("Layer 5, ALM")]
    #[case("ALM, Layer")]
    fn unparseable_recording_locations(#[case] description: &str) {
        assert!(matches!(
            parse_recording_location(description),
            Err(ParseError::UnparseableLocation { .. })
        ));
    }

    #[rstest]
    #[case("350 um", Some(350.0))]
    #[case("depth 412", Some(412.0))]
    #[case("0.41 mm", Some(410.0))]
    #[case("~350µm below pia", Some(350.0))]
    #[case("not recorded", None)]
    fn depths(#[case] description: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_depth(description), expected);
    }

    #[test]
    fn atlas_regions() {
        assert_eq!(atlas_region("left ALM").unwrap(), "alm");
        assert_eq!(atlas_region("vS1").unwrap(), "vs1");
        assert!(atlas_region("  ").is_err());
        assert_eq!(leading_region("vS1 barrel cortex").unwrap(), "vs1");
    }

    #[test]
    fn coordinates() {
        assert_eq!(
            parse_coordinates("2.5 mm anterior, 1.5 mm lateral").unwrap(),
            Coordinates {
                ap: 2.5,
                ml: 1.5,
                dv: 0.0
            }
        );
        assert_eq!(
            parse_coordinates("AP -1.25 ML 3.40 DV 0.80").unwrap(),
            Coordinates {
                ap: -1.25,
                ml: 3.4,
                dv: 0.8
            }
        );
        assert!(parse_coordinates("bregma").is_err());
    }

    #[test]
    fn leading_numbers() {
        assert!((leading_number("473 nm").unwrap() - 473.0).abs() < f64::EPSILON);
        assert!(leading_number("none").is_err());
    }
}
