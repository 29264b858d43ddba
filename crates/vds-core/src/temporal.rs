//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is the single time representation used for certificate
//! validity windows, governance artifact freshness (`issued` /
//! `next_update`), and the verifier's notion of "now".
//!
//! ## Invariants
//!
//! - UTC only, serialized as `YYYY-MM-DDTHH:MM:SSZ`.
//! - Seconds precision: sub-seconds are truncated at construction.
//! - Non-`Z` offsets are rejected by [`Timestamp::parse()`], so a signed
//!   governance body has exactly one canonical rendering of each instant.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SealError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimestamp` if the string is not RFC 3339 or uses an
    /// explicit offset (even `+00:00`).
    pub fn parse(s: &str) -> Result<Self, SealError> {
        if !s.ends_with('Z') {
            return Err(SealError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| SealError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From seconds since the Unix epoch.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, SealError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| SealError::InvalidTimestamp(format!("epoch seconds out of range: {secs}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Seconds since the Unix epoch.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// True if `self` lies in the closed interval `[start, end]`.
    pub fn within(&self, start: &Timestamp, end: &Timestamp) -> bool {
        start <= self && self <= end
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
