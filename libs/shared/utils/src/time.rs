// libs/shared/utils/src/time.rs
//
// Minute-of-day arithmetic shared by slot generation, booking and schedule
// validation. Dates are naive calendar dates everywhere: a date is never
// promoted to a zoned timestamp before its weekday is taken.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid time format '{0}', expected HH:MM")]
    InvalidTimeFormat(String),
}

/// Parse an `HH:MM` 24-hour time into minutes since midnight (0..=1439).
///
/// Storage layers often hand back `HH:MM:SS`; that form is accepted as long
/// as the seconds are zero, since the system works at minute precision.
pub fn to_minutes(value: &str) -> Result<u32, TimeError> {
    let invalid = || TimeError::InvalidTimeFormat(value.to_string());
    let trimmed = value.trim();

    let mut parts = trimmed.split(':');
    let hours = parts.next().ok_or_else(invalid)?;
    let minutes = parts.next().ok_or_else(invalid)?;
    if let Some(seconds) = parts.next() {
        if seconds != "00" {
            return Err(invalid());
        }
    }
    if parts.next().is_some() {
        return Err(invalid());
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Minutes since midnight of a time-of-day; seconds are dropped.
pub fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    if minutes >= MINUTES_PER_DAY {
        return None;
    }
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Render minutes since midnight as `HH:MM`. Values past midnight (an
/// interval end such as 24:00) are rendered without wrapping.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Weekday of a calendar date, 0 = Sunday .. 6 = Saturday.
pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Today's calendar date on the local clock.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// True iff the half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one minute.
pub fn intervals_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Serde adapter for `NaiveTime` fields exchanged as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::{format_minutes, minutes_of, time_from_minutes, to_minutes};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_minutes(minutes_of(*time)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let minutes = to_minutes(&raw).map_err(D::Error::custom)?;
        time_from_minutes(minutes).ok_or_else(|| D::Error::custom(format!("time out of range: {}", raw)))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] NaiveTime);

            let value: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(value.map(|Wrapper(time)| time))
        }
    }
}
