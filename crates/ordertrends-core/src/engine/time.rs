//! Timestamp normalization
//!
//! Every day boundary, grouping key and hour of day in the engine comes from
//! one `TimeNormalizer`, so they all agree on the same time zone.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Wall-clock date-time layouts, interpreted in the configured zone
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts, meaning midnight in the configured zone
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses timestamps and derives calendar days and hours in a fixed zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    tz: Tz,
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TimeNormalizer {
    /// Create a normalizer for the given zone
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Create a normalizer from an IANA zone name such as "Asia/Kolkata"
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| Error::config(format!("unknown time zone '{name}'")))
    }

    /// The configured zone
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Parse a timestamp into an instant
    pub fn parse_instant(&self, input: &str) -> Result<DateTime<Utc>> {
        let s = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive = NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .ok_or_else(|| Error::parse(input, "unrecognized date/time format"))?;

        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(Error::parse(
                input,
                format!("local time does not exist in {}", self.tz.name()),
            )),
        }
    }

    /// Calendar day of an instant
    pub fn calendar_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Hour of day (0-23) of an instant
    pub fn hour_of_day(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.tz).hour()
    }

    /// First instant of a calendar day (00:00:00)
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_boundary(date.and_time(NaiveTime::MIN), true)
    }

    /// Last whole second of a calendar day (23:59:59)
    pub fn day_end(&self, date: NaiveDate) -> DateTime<Utc> {
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.resolve_boundary(date.and_time(end), false)
    }

    // Boundaries can land in a DST gap (some zones skip midnight); step forward
    // until the wall-clock time exists.
    fn resolve_boundary(&self, mut naive: NaiveDateTime, earliest: bool) -> DateTime<Utc> {
        loop {
            match self.tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                LocalResult::Ambiguous(first, last) => {
                    let dt = if earliest { first } else { last };
                    return dt.with_timezone(&Utc);
                }
                LocalResult::None => naive += Duration::minutes(15),
            }
        }
    }
}
