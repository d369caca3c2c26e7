//! ISO-8601 helpers for the wire format.
//!
//! The backend emits and expects UTC timestamps with fractional seconds
//! (`2025-06-10T12:34:56.000Z`), but is not consistent about it: some rows
//! come back with a bare `Z` and no fraction. Parsing normalizes those by
//! injecting a zero fraction before handing the string to chrono.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

/// Formats a timestamp the way the backend expects: UTC, millisecond
/// fraction, trailing `Z`.
pub fn format_iso8601(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Inserts `.000` before a bare trailing `Z` so that fraction-less
/// timestamps parse with the same code path as fractional ones.
pub fn normalize_fractional(raw: &str) -> Cow<'_, str> {
    if let Some(prefix) = raw.strip_suffix('Z') {
        if !prefix.contains('.') {
            return Cow::Owned(format!("{prefix}.000Z"));
        }
    }
    Cow::Borrowed(raw)
}

pub fn parse_iso8601(raw: &str) -> chrono::ParseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&normalize_fractional(raw)).map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter for timestamp fields. Usage:
/// `#[serde(with = "crate::utils::datetime::iso8601")]`.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_iso8601(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso8601(&raw).map_err(serde::de::Error::custom)
    }
}
