//! # Timestamps
//!
//! Defines `Timestamp`, a UTC instant truncated to seconds precision.
//!
//! ## Why Lenient Parsing
//!
//! Blockcerts documents were produced by many issuing tools over several
//! years. Issued-on dates and key rotation dates appear as RFC 3339 with
//! offsets (`2017-06-29T14:58:57.461422+00:00`), as naive datetimes
//! (`2016-05-06T00:00:00`), and as bare dates (`2016-05-06`). Transaction
//! providers report either epoch seconds or RFC 3339. All of these are
//! normalized to the same representation so rotation-window comparisons
//! are exact.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// An issuance, rotation or block time in UTC, whole seconds only.
///
/// Built from the clock ([`Timestamp::now`]), from document strings
/// ([`Timestamp::parse`]) or from provider epoch times
/// ([`Timestamp::from_epoch_secs`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The system clock, sub-seconds dropped.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp, converting any offset to UTC.
    ///
    /// Accepted shapes, tried in order:
    /// - RFC 3339 with `Z` or an explicit offset.
    /// - Naive `YYYY-MM-DDTHH:MM:SS[.frac]`, assumed UTC.
    /// - Bare `YYYY-MM-DD`, taken as midnight UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidField`] naming the rejected input.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self(truncate_to_seconds(naive.and_utc())));
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(midnight.and_utc()));
            }
        }
        Err(ParseError::InvalidField(format!("timestamp {s:?}")))
    }

    /// Block times as reported by blockchain.info.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ParseError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ParseError::InvalidField(format!("epoch seconds {secs}")))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// `2017-06-29T14:58:57Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
