use chrono::NaiveDate;
use serde::Serialize;

#[cfg(feature = "backend")]
use whiskerdb_schema::{virus, virus_injection};

const TITER_EXPONENT_MARKER: &str = "x10";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = virus, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewVirus {
    pub virus_source: String,
    pub virus_name: String,
    pub lot_number: String,
    pub titer: Option<f64>,
}

/// Titers are recorded as `<mantissa>x10<exponent>`, e.g. `"1.5x1013"` for
/// 1.5e13, or as a plain number.
#[must_use]
pub fn parse_titer(raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;

    let Some((mantissa, exponent)) = raw.split_once(TITER_EXPONENT_MARKER) else {
        return raw.parse().ok();
    };

    let mantissa: f64 = mantissa.trim().parse().ok()?;
    let exponent: i32 = exponent.trim().parse().ok()?;

    Some(mantissa * 10f64.powi(exponent))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(
    feature = "backend",
    derive(diesel::Insertable, diesel::Queryable, diesel::Selectable),
    diesel(table_name = virus_injection, check_for_backend(diesel::sqlite::Sqlite))
)]
pub struct NewVirusInjection {
    pub subject_id: String,
    pub virus_id: i32,
    pub action_location_id: i32,
    pub injection_date: NaiveDate,
    pub injection_depth: f64,
    pub injection_volume: f64,
}
