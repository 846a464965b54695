// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! DTN timestamp conversion.
//!
//! BP7 creation timestamps count milliseconds since the DTN epoch,
//! 2000-01-01T00:00:00Z (RFC 9171 §4.2.6).

use chrono::{DateTime, Utc};

/// Milliseconds between the Unix epoch and the DTN epoch.
pub const DTN_EPOCH_UNIX_MS: i64 = 946_684_800_000;

/// Convert a DTN creation timestamp to wall-clock UTC.
///
/// Out-of-range values clamp to the DTN epoch rather than failing; a bundle
/// with a nonsense timestamp is still an article.
pub fn from_dtn_timestamp(ms: u64) -> DateTime<Utc> {
    let unix_ms = (ms as i64).saturating_add(DTN_EPOCH_UNIX_MS);
    DateTime::<Utc>::from_timestamp_millis(unix_ms)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp_millis(DTN_EPOCH_UNIX_MS).unwrap_or_default())
}

/// Convert wall-clock UTC to a DTN timestamp. Times before the DTN epoch
/// clamp to zero.
pub fn to_dtn_timestamp(dt: DateTime<Utc>) -> u64 {
    dt.timestamp_millis().saturating_sub(DTN_EPOCH_UNIX_MS).max(0) as u64
}

#[cfg(test)]
#[path = "dtntime_tests.rs"]
mod tests;
