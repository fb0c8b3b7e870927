//! Small helpers shared by every crate in the workspace.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Generates an opaque, unique identifier (a random v4 UUID in hyphenated form).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Formats a timestamp as RFC 3339 with millisecond precision, e.g.
/// `2024-05-01T12:30:00.000Z`.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns `true` if the key looks usable. Only emptiness is checked; the
/// streaming service is the authority on whether a key is actually valid.
pub fn is_valid_api_key(api_key: &str) -> bool {
    !api_key.is_empty()
}
