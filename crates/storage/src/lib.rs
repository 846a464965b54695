// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! The article store.
//!
//! Tables for newsgroups, articles, and the outbound spool, held in memory
//! and persisted through an append-only JSONL journal plus zstd-compressed
//! snapshot checkpoints. Every mutation commits as an atomic record batch:
//! validate against the in-memory state, append + flush the records, then
//! apply them. Recovery loads the latest snapshot and replays journal
//! records past its sequence number.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod journal;
mod snapshot;
mod state;
mod store;

pub use journal::{Journal, JournalEntry};
pub use snapshot::{load_snapshot, Snapshot, CURRENT_SNAPSHOT_VERSION};
pub use state::{Record, TableState};
pub use store::{GroupStats, NewArticle, NewSpoolEntry, Store, StoreError};
