// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Append-only JSONL journal of committed records.
//!
//! One JSON object per line: `{"seq": n, "record": {...}}`. Sequence
//! numbers are monotone across checkpoints. A corrupt tail is rotated to a
//! `.bak` file on open and the valid prefix preserved.

use crate::snapshot::rotate_bak_path;
use crate::state::Record;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One journaled record with its sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub record: Record,
}

/// The journal file handle. Writes are buffered; `flush` is the commit
/// barrier and must be called before records are applied.
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
    write_seq: u64,
}

impl Journal {
    /// Open (or create) the journal, recovering from a corrupt tail.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let mut entries = Vec::new();
        let mut corrupt = false;

        if path.exists() {
            let raw = std::fs::read(path)?;
            let text = String::from_utf8_lossy(&raw);
            for line in text.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<JournalEntry>(line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "corrupt journal line, truncating tail");
                        corrupt = true;
                        break;
                    }
                }
            }
        }

        if corrupt {
            let bak = rotate_bak_path(path);
            std::fs::rename(path, &bak)?;
            let mut clean = BufWriter::new(File::create(path)?);
            for entry in &entries {
                writeln!(clean, "{}", serde_json::to_string(entry)?)?;
            }
            clean.flush()?;
        }

        let write_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self { path: path.to_path_buf(), writer: BufWriter::new(file), write_seq })
    }

    /// Append a record to the write buffer; returns its sequence number.
    pub fn append(&mut self, record: &Record) -> Result<u64, std::io::Error> {
        self.write_seq += 1;
        let entry = JournalEntry { seq: self.write_seq, record: record.clone() };
        writeln!(self.writer, "{}", serde_json::to_string(&entry)?)?;
        Ok(self.write_seq)
    }

    /// Flush buffered records to disk. The commit barrier.
    pub fn flush(&mut self) -> Result<(), std::io::Error> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()
    }

    /// Read every entry currently on disk, stopping at corruption.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, std::io::Error> {
        let mut entries = Vec::new();
        if !self.path.exists() {
            return Ok(entries);
        }
        let raw = std::fs::read(&self.path)?;
        let text = String::from_utf8_lossy(&raw);
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(_) => break,
            }
        }
        Ok(entries)
    }

    /// Truncate the journal after a snapshot checkpoint. The sequence
    /// counter keeps counting so snapshot/journal ordering stays total.
    pub fn reset(&mut self) -> Result<(), std::io::Error> {
        self.writer.flush()?;
        let file = File::create(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }

    /// Highest sequence number handed out so far.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
