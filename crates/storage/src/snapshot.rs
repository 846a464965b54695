// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Snapshot persistence for fast recovery.
//!
//! A snapshot is the complete table state at a journal sequence number,
//! JSON-encoded and zstd-compressed, written atomically via a temp file.
//! Recovery loads the snapshot and replays journal entries after its
//! sequence.

use crate::state::TableState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

const ZSTD_LEVEL: i32 = 3;

/// A snapshot of the table state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    /// Journal sequence number at the time of snapshot
    pub seq: u64,
    pub state: TableState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: TableState, created_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at }
    }

    /// Write atomically: encode, compress, write to a temp sibling, rename.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_vec(self)?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, compressed)?;
        fs::rename(&tmp, path)
    }
}

/// Load the snapshot if present. A corrupt snapshot is rotated to `.bak`
/// and ignored; recovery then falls back to full journal replay.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, std::io::Error> {
    if !path.exists() {
        return Ok(None);
    }
    let compressed = fs::read(path)?;
    let decoded = zstd::decode_all(compressed.as_slice())
        .and_then(|json| serde_json::from_slice::<Snapshot>(&json).map_err(Into::into));
    match decoded {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt snapshot, rotating to .bak");
            let bak = rotate_bak_path(path);
            fs::rename(path, bak)?;
            Ok(None)
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    // Remove the oldest if at capacity
    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    // Shift existing backups up by one
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}
