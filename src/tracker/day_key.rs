use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar-day identifier, rendered as `YYYY-MM-DD`.
///
/// The key is the date portion of the UTC-normalized instant, not the
/// device-local calendar day. A 23:30 -05:00 meal therefore lands on the
/// next UTC day. This matches how the mobile app has always grouped meals;
/// changing it would rewrite streak and goal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(Date);

impl DayKey {
    pub fn of(ts: OffsetDateTime) -> Self {
        Self(ts.to_offset(UtcOffset::UTC).date())
    }

    pub fn today() -> Self {
        Self::of(OffsetDateTime::now_utc())
    }

    pub fn is_today(ts: OffsetDateTime) -> bool {
        Self::of(ts) == Self::today()
    }

    /// Calendar-correct step back; None at the boundary of the date range.
    pub fn previous(self) -> Option<Self> {
        self.0.previous_day().map(Self)
    }

    /// The `days` consecutive keys ending at `end`, ascending.
    pub fn window_ending(end: Self, days: u32) -> Vec<Self> {
        let mut window = Vec::with_capacity(days as usize);
        let mut cursor = Some(end);
        for _ in 0..days {
            match cursor {
                Some(day) => {
                    window.push(day);
                    cursor = day.previous();
                }
                None => break,
            }
        }
        window.reverse();
        window
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(DAY_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for DayKey {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s, DAY_FORMAT).map(Self)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
