// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Persisted record types: newsgroups, articles, and the outbound spool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newsgroup carried by this server.
///
/// The configured newsgroup list is the single source of truth; groups are
/// created and removed at startup to match it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsgroup {
    pub id: i64,
    /// Unique dot-separated name, e.g. `dtn.general`.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A committed, reader-visible article.
///
/// `id` is assigned by the store in commit order and doubles as the NNTP
/// article number. `message_id` is globally unique in canonical
/// `<ts-seq@src.dtn>` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub newsgroup_id: i64,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub message_id: String,
    pub references: String,
    pub created_at: DateTime<Utc>,
    pub path: Option<String>,
    pub reply_to: Option<String>,
    pub organization: Option<String>,
    pub user_agent: Option<String>,
}

impl Article {
    /// Body size in bytes, as reported in overview `:bytes`.
    pub fn byte_len(&self) -> usize {
        self.body.len()
    }

    /// Body line count, as reported in overview `:lines`.
    pub fn line_count(&self) -> usize {
        self.body.split('\n').count()
    }
}

/// The article payload that travels inside a bundle, in decompressed text
/// form. The spool always stores this form so the spool hash agrees with
/// the hash computed at acknowledgement time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolPayload {
    pub subject: String,
    pub body: String,
    pub references: String,
}

/// A locally posted article that DTND has not yet acknowledged.
///
/// Entries are deleted exactly when the matching acknowledgement arrives on
/// the backchannel and an [`Article`] has been committed. While DTND is
/// unreachable they linger, accumulating `error_log` lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolEntry {
    pub id: i64,
    /// BP7 sender URI, `dtn://<node>/mail/<domain>/<user>`.
    pub source: String,
    /// BP7 group endpoint, `dtn://<group>/~news`.
    pub destination: String,
    pub data: SpoolPayload,
    pub delivery_notification: bool,
    pub lifetime_ms: u64,
    /// Hex SHA-256 over `(source, destination, subject, body, references)`;
    /// the join key between posts and acknowledgements.
    pub hash: String,
    pub retries: u32,
    /// Append-only delivery failure log.
    pub error_log: String,
    pub created_at: DateTime<Utc>,
}
