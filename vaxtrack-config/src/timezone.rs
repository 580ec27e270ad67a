//! Time zone used to decide which calendar day "yesterday" is.
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// `local` (system time zone), `UTC`, or a fixed offset such as `+08:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeZoneSpec {
    Local,
    Fixed(FixedOffset),
}

impl Default for TimeZoneSpec {
    /// Hong Kong Time; press releases are dated in the publisher's zone.
    fn default() -> Self {
        Self::Fixed(FixedOffset::east_opt(8 * 3600).expect("+08:00 is in range"))
    }
}

impl TimeZoneSpec {
    /// Calendar date of `now` in this zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => now.with_timezone(offset).date_naive(),
        }
    }

    /// The day before [`TimeZoneSpec::today`].
    ///
    /// ```
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use vaxtrack_config::TimeZoneSpec;
    ///
    /// let hkt: TimeZoneSpec = "+08:00".parse().unwrap();
    /// // 20:00 UTC on the 15th is already the 16th in Hong Kong.
    /// let now = Utc.with_ymd_and_hms(2021, 3, 15, 20, 0, 0).unwrap();
    /// assert_eq!(hkt.yesterday(now), NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
    /// ```
    pub fn yesterday(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = self.today(now);
        today.pred_opt().unwrap_or(today)
    }
}

impl FromStr for TimeZoneSpec {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(Self::Fixed(FixedOffset::east_opt(0).expect("zero offset")));
        }
        s.parse::<FixedOffset>()
            .map(Self::Fixed)
            .map_err(|e| format!("invalid timezone {s:?} (expected local, UTC, or +HH:MM): {e}"))
    }
}

impl TryFrom<String> for TimeZoneSpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}
