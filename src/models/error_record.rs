//! Error Record
//!
//! The single domain entity: a raw error log line paired with the
//! remediation text generated for it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Namespace every cached error record lives under
pub const DEFAULT_KEY_PREFIX: &str = "error:";

/// Prefix of the fallback solution stored when the completion call fails
pub const API_ERROR_PREFIX: &str = "API error:";

/// A processed error and its generated remedy.
///
/// All three fields are required on decode. A stored value that lacks one of
/// them is rejected rather than patched with placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Raw log text as received from the queue
    pub error: String,
    /// Generated remediation, or an `API error: ...` description
    pub solution: String,
    /// Processing time; written as RFC 3339, read as any ISO-8601 date-time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(error: impl Into<String>, solution: impl Into<String>) -> Self {
        Self { error: error.into(), solution: solution.into(), timestamp: Utc::now() }
    }

    /// Record substituted when the completion service failed
    pub fn api_failure(error: impl Into<String>, details: impl std::fmt::Display) -> Self {
        Self::new(error, format!("{} {}", API_ERROR_PREFIX, details))
    }

    pub fn is_api_failure(&self) -> bool {
        self.solution.starts_with(API_ERROR_PREFIX)
    }

    /// Cache key for a raw error text: the namespace prefix followed by the text itself
    pub fn cache_key(prefix: &str, error_text: &str) -> String {
        format!("{}{}", prefix, error_text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(e) => raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()).map_err(|_| e),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
