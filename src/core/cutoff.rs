//! Cutoff time specification
//!
//! The export window starts at a cutoff time given either relative to now
//! (`H-<n>` hours ago, `D-<n>` days ago) or as an absolute timestamp.

use crate::domain::{FerryError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use std::fmt;
use std::str::FromStr;

/// Default cutoff: the last 48 hours
pub const DEFAULT_SINCE_TIME: &str = "H-48";

/// Parsed cutoff specification
///
/// # Examples
///
/// ```
/// use ferry::core::cutoff::CutoffSpec;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
/// let spec: CutoffSpec = "D-2".parse().unwrap();
/// assert_eq!(spec.resolve(now).unwrap(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffSpec {
    /// `H-<n>`
    HoursAgo(u32),
    /// `D-<n>`
    DaysAgo(u32),
    /// Absolute instant
    At(DateTime<Utc>),
}

impl CutoffSpec {
    /// Resolve to a concrete instant relative to `now`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the offset reaches before the
    /// earliest representable time.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let offset = match self {
            CutoffSpec::HoursAgo(hours) => TimeDelta::try_hours(i64::from(*hours)),
            CutoffSpec::DaysAgo(days) => TimeDelta::try_days(i64::from(*days)),
            CutoffSpec::At(at) => return Ok(*at),
        };

        offset
            .and_then(|offset| now.checked_sub_signed(offset))
            .ok_or_else(|| {
                FerryError::Configuration(format!("since_time '{self}' is out of range"))
            })
    }

    /// Resolve relative to the current time
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the offset is out of range.
    pub fn resolve_now(&self) -> Result<DateTime<Utc>> {
        self.resolve(Utc::now())
    }
}

impl Default for CutoffSpec {
    fn default() -> Self {
        CutoffSpec::HoursAgo(48)
    }
}

impl fmt::Display for CutoffSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutoffSpec::HoursAgo(hours) => write!(f, "H-{hours}"),
            CutoffSpec::DaysAgo(days) => write!(f, "D-{days}"),
            CutoffSpec::At(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

impl FromStr for CutoffSpec {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(hours) = s.strip_prefix("H-") {
            return parse_offset(s, hours).map(CutoffSpec::HoursAgo);
        }
        if let Some(days) = s.strip_prefix("D-") {
            return parse_offset(s, days).map(CutoffSpec::DaysAgo);
        }

        parse_absolute(s).map(CutoffSpec::At).ok_or_else(|| {
            FerryError::Configuration(format!(
                "Invalid since_time '{s}'. Expected 'H-<hours>', 'D-<days>' or an ISO-8601 timestamp"
            ))
        })
    }
}

fn parse_offset(spec: &str, digits: &str) -> Result<u32> {
    digits.parse::<u32>().map_err(|e| {
        FerryError::Configuration(format!("Invalid since_time offset '{spec}': {e}"))
    })
}

// Naive forms are taken as UTC.
fn parse_absolute(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_hours_ago() {
        let spec: CutoffSpec = "H-48".parse().unwrap();
        assert_eq!(spec, CutoffSpec::HoursAgo(48));
        assert_eq!(
            spec.resolve(now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_days_ago() {
        let spec: CutoffSpec = "D-7".parse().unwrap();
        assert_eq!(
            spec.resolve(now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
        );
    }

    #[test_case("2024-01-01T00:00:00+00:00" ; "rfc3339 offset")]
    #[test_case("2024-01-01T00:00:00Z" ; "rfc3339 zulu")]
    #[test_case("2024-01-01T00:00:00" ; "naive with t")]
    #[test_case("2024-01-01 00:00:00" ; "naive with space")]
    #[test_case("2024-01-01" ; "date only")]
    fn test_absolute_forms(input: &str) {
        let spec: CutoffSpec = input.parse().unwrap();
        assert_eq!(
            spec.resolve(now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_absolute_with_offset_normalised_to_utc() {
        let spec: CutoffSpec = "2024-01-01T02:00:00+02:00".parse().unwrap();
        assert_eq!(
            spec.resolve(now()).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test_case("H-" ; "missing hours")]
    #[test_case("D-x" ; "non numeric days")]
    #[test_case("H--3" ; "negative hours")]
    #[test_case("yesterday" ; "free text")]
    fn test_invalid_specs(input: &str) {
        let err = input.parse::<CutoffSpec>().unwrap_err();
        assert!(matches!(err, FerryError::Configuration(_)));
    }

    #[test_case("D-999999999" ; "days")]
    #[test_case("H-4294967295" ; "hours")]
    fn test_out_of_range_offset_is_config_error(input: &str) {
        let spec: CutoffSpec = input.parse().unwrap();
        assert!(matches!(
            spec.resolve(now()),
            Err(FerryError::Configuration(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for spec in ["H-48", "D-2"] {
            assert_eq!(spec.parse::<CutoffSpec>().unwrap().to_string(), spec);
        }
    }

    #[test]
    fn test_default_matches_constant() {
        assert_eq!(
            CutoffSpec::default(),
            DEFAULT_SINCE_TIME.parse::<CutoffSpec>().unwrap()
        );
    }
}
