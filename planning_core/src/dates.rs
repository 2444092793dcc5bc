//! Calendar-date parsing and month arithmetic

use crate::error::{PlanningError, Result};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// What to do with a date that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateParsing {
    /// Fail with [`PlanningError::InvalidArgument`]
    Strict,
    /// Treat the value as missing; rows without a date are left out
    #[default]
    Lenient,
}

impl DateParsing {
    /// Parse a raw cell from column `column` at `row`.
    ///
    /// Returns `Ok(None)` only under the lenient policy.
    pub fn parse(&self, raw: Option<&str>, column: &str, row: usize) -> Result<Option<NaiveDate>> {
        match raw.and_then(parse_date) {
            Some(date) => Ok(Some(date)),
            None => match self {
                DateParsing::Lenient => Ok(None),
                DateParsing::Strict => Err(PlanningError::InvalidArgument(format!(
                    "unparseable date {:?} in column '{}' at row {}",
                    raw.unwrap_or(""),
                    column,
                    row
                ))),
            },
        }
    }
}

impl std::str::FromStr for DateParsing {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(DateParsing::Strict),
            "lenient" => Ok(DateParsing::Lenient),
            other => Err(PlanningError::InvalidArgument(format!(
                "unknown date parsing policy '{}', expected 'strict' or 'lenient'",
                other
            ))),
        }
    }
}

/// Parse an ISO-8601 calendar date, also accepting a date-time whose date
/// part is taken.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Shift `date` by whole calendar months.
///
/// Days past the end of the target month clamp to its last day, so
/// Jan 31 + 1 month is Feb 28 (or 29). Returns `None` outside chrono's range.
pub fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

/// Month start `steps` months after the month containing `date`
pub fn months_after(date: NaiveDate, steps: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2024-03-15", Some(ymd(2024, 3, 15)))]
    #[case(" 2024-03-15 ", Some(ymd(2024, 3, 15)))]
    #[case("2024-03-15T08:30:00", Some(ymd(2024, 3, 15)))]
    #[case("2024-03-15 08:30:00", Some(ymd(2024, 3, 15)))]
    #[case("2024-02-30", None)]
    #[case("15/03/2024", None)]
    #[case("", None)]
    fn test_parse_date(#[case] raw: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_date(raw), expected);
    }

    #[test]
    fn test_strict_policy_rejects_bad_dates() {
        let err = DateParsing::Strict
            .parse(Some("not-a-date"), "date", 4)
            .unwrap_err();
        assert!(matches!(err, PlanningError::InvalidArgument(_)));
        assert!(err.to_string().contains("row 4"));
    }

    #[test]
    fn test_lenient_policy_yields_missing() {
        assert_eq!(DateParsing::Lenient.parse(Some("nope"), "date", 0).unwrap(), None);
        assert_eq!(DateParsing::Lenient.parse(None, "date", 0).unwrap(), None);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Strict".parse::<DateParsing>().unwrap(), DateParsing::Strict);
        assert_eq!("lenient".parse::<DateParsing>().unwrap(), DateParsing::Lenient);
        assert!("loose".parse::<DateParsing>().is_err());
    }

    #[rstest]
    #[case(ymd(2024, 1, 31), 1, ymd(2024, 2, 29))]
    #[case(ymd(2023, 1, 31), 1, ymd(2023, 2, 28))]
    #[case(ymd(2024, 3, 31), -1, ymd(2024, 2, 29))]
    #[case(ymd(2024, 5, 15), 0, ymd(2024, 5, 15))]
    #[case(ymd(2024, 11, 1), 3, ymd(2025, 2, 1))]
    #[case(ymd(2024, 1, 1), -13, ymd(2022, 12, 1))]
    fn test_shift_months(#[case] date: NaiveDate, #[case] months: i32, #[case] expected: NaiveDate) {
        assert_eq!(shift_months(date, months), Some(expected));
    }

    #[test]
    fn test_month_start_and_months_after() {
        assert_eq!(month_start(ymd(2024, 2, 29)), ymd(2024, 2, 1));
        assert_eq!(months_after(ymd(2024, 12, 17), 1), Some(ymd(2025, 1, 1)));
    }
}
