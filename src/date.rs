use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

/// Calendar date a post was published on, in the offset it was written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostDate(Date);

impl PostDate {
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Parse a post timestamp and drop the time of day.
    ///
    /// Accepts `2024-03-20T10:00:00+0000` (the corpus form), the same with a
    /// `+00:00` offset, and anything RFC 3339 accepts. Returns `None` for
    /// impossible or unparsable values.
    pub fn from_timestamp(s: &str) -> Option<Self> {
        let compact = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
        );
        let colon = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        );
        let s = s.trim();
        OffsetDateTime::parse(s, &compact)
            .or_else(|_| OffsetDateTime::parse(s, &colon))
            .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
            .ok()
            .map(|dt| Self(dt.date()))
    }

    pub fn as_date(&self) -> Date {
        self.0
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
    }
}

impl FromStr for PostDate {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.trim().split('-').collect();
        if parts.len() != 3 {
            return Err("expected YYYY-MM-DD".into());
        }
        let year: i32 = parts[0].parse().map_err(|_| "invalid year")?;
        let month: u8 = parts[1].parse().map_err(|_| "invalid month")?;
        let day: u8 = parts[2].parse().map_err(|_| "invalid day")?;
        Self::new(year, month, day).ok_or_else(|| format!("no such date: {s}"))
    }
}

impl Serialize for PostDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
