use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ParseError, Result};

pub const DATE_FORMAT_YMD: &str = "%y%m%d";
// Some acquisition files swap day and month
pub const DATE_FORMAT_YDM: &str = "%y%d%m";

const DATE_PREFIX_LEN: usize = 6;

/// Parses the leading six characters of `raw` as `yymmdd`, falling back to
/// `yyddmm`.
///
/// # Errors
/// Returns [`ParseError::UnparseableDate`] if neither format applies.
pub fn parse_date_prefix(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let prefix: String = trimmed.chars().take(DATE_PREFIX_LEN).collect();

    [DATE_FORMAT_YMD, DATE_FORMAT_YDM]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&prefix, format).ok())
        .ok_or_else(|| ParseError::UnparseableDate {
            raw: raw.to_string(),
        })
}

#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("141021", (2014, 10, 21))]
    #[case("141021_extra", (2014, 10, 21))]
    #[case("142110", (2014, 10, 21))]
    #[case(" 150102 ", (2015, 1, 2))]
    fn date_prefixes(#[case] raw: &str, #[case] expected: (i32, u32, u32)) {
        let (y, m, d) = expected;
        assert_eq!(
            parse_date_prefix(raw).unwrap(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        );
    }

    #[rstest]
    #[case("")]
    #[case("14")]
    #[case("143535")]
    #[case("not a date")]
    fn bad_dates(#[case] raw: &str) {
        assert_eq!(
            parse_date_prefix(raw),
            Err(ParseError::UnparseableDate { raw: raw.to_string() })
        );
    }
}
