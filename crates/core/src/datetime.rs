//! Millisecond-precision timestamp type
//!
//! `DateTime` is the store-native timestamp: signed milliseconds since Unix
//! epoch (1970-01-01 00:00:00 UTC). Negative values are dates before epoch.
//!
//! ```
//! use docadmin_core::DateTime;
//!
//! let ts = DateTime::parse_rfc3339("2024-01-01T00:00:00Z").unwrap();
//! assert_eq!(ts.as_millis(), 1_704_067_200_000);
//! assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00.000Z");
//! ```

use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateTime(i64);

impl DateTime {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: DateTime = DateTime(0);

    /// Timestamp for the current moment
    ///
    /// Returns epoch if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        DateTime(duration.as_millis() as i64)
    }

    /// Create from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        DateTime(millis)
    }

    /// Create from fractional milliseconds, truncating toward zero
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    pub fn from_float_millis(millis: f64) -> Option<Self> {
        const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
        if millis.is_finite() && (-LIMIT..LIMIT).contains(&millis) {
            Some(DateTime(millis.trunc() as i64))
        } else {
            None
        }
    }

    /// Milliseconds since epoch
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Parse an ISO-8601 / RFC 3339 string
    ///
    /// Returns `None` for anything chrono cannot parse; callers treat that
    /// as "not a timestamp" rather than an error.
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        chrono::DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| DateTime(dt.timestamp_millis()))
    }

    /// Render as RFC 3339 with millisecond precision and a `Z` suffix
    ///
    /// Falls back to the raw millisecond count for values outside chrono's range.
    pub fn to_rfc3339(&self) -> String {
        match Utc.timestamp_millis_opt(self.0).single() {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.0.to_string(),
        }
    }

    /// True if the date falls in years 1970..=9999, the range relaxed
    /// extended JSON renders as an ISO string
    pub fn is_relaxed_renderable(&self) -> bool {
        const MAX_MILLIS: i64 = 253_402_300_799_999; // 9999-12-31T23:59:59.999Z
        (0..=MAX_MILLIS).contains(&self.0)
    }
}

impl Default for DateTime {
    fn default() -> Self {
        DateTime::EPOCH
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<i64> for DateTime {
    fn from(millis: i64) -> Self {
        DateTime::from_millis(millis)
    }
}

impl From<DateTime> for i64 {
    fn from(ts: DateTime) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        assert_eq!(DateTime::EPOCH.as_millis(), 0);
        assert_eq!(DateTime::EPOCH.to_rfc3339(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_parse_utc() {
        let ts = DateTime::parse_rfc3339("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.as_millis(), 1_704_067_200_000);
    }

    #[test]
    fn test_parse_with_offset_and_fraction() {
        let ts = DateTime::parse_rfc3339("2024-01-01T02:00:00.250+02:00").unwrap();
        assert_eq!(ts.as_millis(), 1_704_067_200_250);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(DateTime::parse_rfc3339("yesterday").is_none());
        assert!(DateTime::parse_rfc3339("").is_none());
    }

    #[test]
    fn test_from_float_millis() {
        assert_eq!(DateTime::from_float_millis(1.9), Some(DateTime::from_millis(1)));
        assert_eq!(DateTime::from_float_millis(-1.9), Some(DateTime::from_millis(-1)));
        assert_eq!(DateTime::from_float_millis(f64::NAN), None);
        assert_eq!(DateTime::from_float_millis(f64::INFINITY), None);
        assert_eq!(DateTime::from_float_millis(1e19), None);
    }

    #[test]
    fn test_negative_millis_render() {
        let ts = DateTime::from_millis(-1000);
        assert_eq!(ts.to_rfc3339(), "1969-12-31T23:59:59.000Z");
        assert!(!ts.is_relaxed_renderable());
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(DateTime::now() > DateTime::EPOCH);
    }

    #[test]
    fn test_ordering() {
        let a = DateTime::from_millis(1);
        let b = DateTime::from_millis(2);
        assert!(a < b);
        assert_eq!(i64::from(b), 2);
    }
}
