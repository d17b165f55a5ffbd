//! Sheet version history.

use chrono::{DateTime, Utc};

use gqlsheets_protocol::Version;

/// Human-readable label for a version, e.g. `2023-11-14 22:13:20 UTC`.
///
/// Returns `None` when the version is not a millisecond timestamp.
pub fn version_label(version: &Version) -> Option<String> {
    let ms = version.timestamp_ms()?;
    let at: DateTime<Utc> = DateTime::from_timestamp_millis(ms)?;
    Some(at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// The most recent version: the last one the store listed.
///
/// The store lists versions oldest first; list order is trusted over the
/// timestamps.
pub fn latest_version(versions: &[Version]) -> Option<&Version> {
    versions.last()
}
