//! Date normalisation shared by the client model and the storage layer.
//!
//! Calendar-day fields may arrive as epoch milliseconds, RFC 3339 timestamps or
//! plain `YYYY-MM-DD` strings depending on who produced them. They are always
//! normalised to a [`NaiveDate`] and written back as `YYYY-MM-DD`. Storage keeps
//! every temporal value as epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstant {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl RawInstant {
    fn into_day(self) -> Option<NaiveDate> {
        match self {
            Self::Millis(ms) => Some(epoch_millis_to_day(ms)),
            #[allow(clippy::cast_possible_truncation)]
            Self::Fractional(ms) => Some(epoch_millis_to_day(ms as i64)),
            Self::Text(text) => parse_calendar_day(&text),
        }
    }

    fn into_timestamp(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => DateTime::from_timestamp_millis(ms),
            #[allow(clippy::cast_possible_truncation)]
            Self::Fractional(ms) => DateTime::from_timestamp_millis(ms as i64),
            Self::Text(text) => parse_timestamp(&text),
        }
    }
}

/// Parses a calendar day from either `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps keep the calendar day of their own offset, so a log written late
/// in the evening west of UTC stays on the day the user saw.
#[must_use]
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, DAY_FORMAT).ok())
        })
}

/// Parses an instant from an RFC 3339 timestamp or a bare calendar day (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
                .ok()
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        })
}

/// Storage representation of a calendar day: midnight UTC in epoch milliseconds.
#[must_use]
pub fn day_to_epoch_millis(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Inverse of [`day_to_epoch_millis`]. Out-of-range values collapse to the epoch.
#[must_use]
pub fn epoch_millis_to_day(ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(ms).map_or_else(NaiveDate::default, |dt| dt.date_naive())
}

/// Out-of-range values collapse to the epoch.
#[must_use]
pub fn epoch_millis_to_timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// `#[serde(with = "calendar_day")]` for required calendar-day fields.
pub mod calendar_day {
    use super::{DAY_FORMAT, RawInstant};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Writes `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&day.format(DAY_FORMAT).to_string())
    }

    /// Accepts epoch milliseconds, RFC 3339 or `YYYY-MM-DD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        RawInstant::deserialize(deserializer)?
            .into_day()
            .ok_or_else(|| D::Error::custom("unrecognised calendar day"))
    }
}

/// `#[serde(default, with = "calendar_day_opt")]` for optional calendar-day fields.
pub mod calendar_day_opt {
    use super::{DAY_FORMAT, RawInstant};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Writes `YYYY-MM-DD` or `null`.
    pub fn serialize<S: Serializer>(
        day: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match day {
            Some(day) => serializer.serialize_str(&day.format(DAY_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Accepts `null` in addition to every calendar-day form.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        Option::<RawInstant>::deserialize(deserializer)?
            .map(|raw| {
                raw.into_day()
                    .ok_or_else(|| D::Error::custom("unrecognised calendar day"))
            })
            .transpose()
    }
}

/// `#[serde(with = "timestamp")]` for creation instants.
pub mod timestamp {
    use super::RawInstant;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    /// Writes RFC 3339.
    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&instant.to_rfc3339())
    }

    /// Accepts epoch milliseconds, RFC 3339 or `YYYY-MM-DD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        RawInstant::deserialize(deserializer)?
            .into_timestamp()
            .ok_or_else(|| D::Error::custom("unrecognised timestamp"))
    }
}
