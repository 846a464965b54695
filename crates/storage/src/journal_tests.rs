// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use bn_core::Newsgroup;
use chrono::Utc;
use tempfile::tempdir;

fn test_record(name: &str) -> Record {
    Record::GroupCreated {
        group: Newsgroup {
            id: 1,
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        },
    }
}

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    let journal = Journal::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(journal.write_seq(), 0);
}

#[test]
fn append_and_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    let mut journal = Journal::open(&path).unwrap();
    assert_eq!(journal.append(&test_record("a")).unwrap(), 1);
    assert_eq!(journal.append(&test_record("b")).unwrap(), 2);
    journal.flush().unwrap();

    let entries = journal.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 1);
    assert_eq!(entries[1].seq, 2);
}

#[test]
fn reopen_continues_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&test_record("a")).unwrap();
        journal.flush().unwrap();
    }

    let mut journal = Journal::open(&path).unwrap();
    assert_eq!(journal.write_seq(), 1);
    assert_eq!(journal.append(&test_record("b")).unwrap(), 2);
}

#[test]
fn reset_truncates_but_keeps_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    let mut journal = Journal::open(&path).unwrap();
    journal.append(&test_record("a")).unwrap();
    journal.flush().unwrap();
    journal.reset().unwrap();

    assert!(journal.entries().unwrap().is_empty());
    assert_eq!(journal.append(&test_record("b")).unwrap(), 2);
}

#[test]
fn corrupt_tail_is_rotated_and_prefix_preserved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&test_record("a")).unwrap();
        journal.append(&test_record("b")).unwrap();
        journal.flush().unwrap();
    }
    {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"not-valid-json\n").unwrap();
    }

    let journal = Journal::open(&path).unwrap();
    assert_eq!(journal.write_seq(), 2);
    assert!(path.with_extension("bak").exists());
    assert_eq!(journal.entries().unwrap().len(), 2);
}

#[test]
fn binary_garbage_is_treated_as_corruption() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.journal");

    std::fs::write(&path, b"\x80\x81\x82\xff\xfe\n").unwrap();

    let journal = Journal::open(&path).unwrap();
    assert_eq!(journal.write_seq(), 0);
    assert!(path.with_extension("bak").exists());
}
