//! Windows FILETIME timestamps as used on the wire.
//!
//! The API server reports every date-time as a count of 100-nanosecond
//! intervals since 1601-01-01 00:00:00 UTC, sent either as a JSON integer or
//! as a decimal string. [`FileTime`] keeps the raw tick count so decoding
//! never loses information; conversion to `chrono` happens on demand.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ticks per second (one tick is 100 ns).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Seconds between 1601-01-01 and the Unix epoch.
const EPOCH_DIFFERENCE_SECS: i64 = 11_644_473_600;

/// FILETIME tick count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileTime(pub u64);

impl FileTime {
    /// 1601-01-01 00:00:00 UTC, the zero value.
    pub const EPOCH: FileTime = FileTime(0);

    /// Convert to UTC. Returns `None` when the tick count is beyond chrono's
    /// representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let ticks = i64::try_from(self.0).ok()?;
        let secs = ticks / TICKS_PER_SECOND - EPOCH_DIFFERENCE_SECS;
        let nanos = (ticks % TICKS_PER_SECOND) * 100;
        Utc.timestamp_opt(secs, nanos as u32).single()
    }

    /// Convert from UTC. Instants before 1601 clamp to [`FileTime::EPOCH`].
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        let since_epoch = value.signed_duration_since(Self::epoch_datetime());
        if since_epoch < Duration::zero() {
            return Self::EPOCH;
        }
        let secs = since_epoch.num_seconds();
        let sub_ticks = i64::from(since_epoch.subsec_nanos()) / 100;
        let ticks = secs
            .saturating_mul(TICKS_PER_SECOND)
            .saturating_add(sub_ticks);
        FileTime(ticks as u64)
    }

    /// Raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }

    fn epoch_datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl From<DateTime<Utc>> for FileTime {
    fn from(value: DateTime<Utc>) -> Self {
        FileTime::from_datetime(value)
    }
}

impl Serialize for FileTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for FileTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FileTimeVisitor)
    }
}

struct FileTimeVisitor;

impl<'de> Visitor<'de> for FileTimeVisitor {
    type Value = FileTime;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a FILETIME tick count as integer or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FileTime, E> {
        Ok(FileTime(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FileTime, E> {
        u64::try_from(v)
            .map(FileTime)
            .map_err(|_| E::custom(format!("negative FILETIME {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FileTime, E> {
        v.trim()
            .parse::<u64>()
            .map(FileTime)
            .map_err(|_| E::custom(format!("invalid FILETIME string {:?}", v)))
    }
}
