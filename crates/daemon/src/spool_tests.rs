// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use crate::test_support::{backend, test_config};
use bn_wire::decode_payload;
use tokio_util::sync::CancellationToken;

fn post_buffer() -> Vec<String> {
    ["Newsgroups: g.test", "Subject: hi", "", "body line"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[tokio::test]
async fn post_spools_and_sends() {
    let backend = backend(&["g.test"]);
    let mut rx = backend.connect_stream();

    backend.spool.post(&post_buffer()).await.unwrap();

    let entries = backend.store.spool_entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.source, "dtn://n1/mail/example.org/alice");
    assert_eq!(entry.destination, "dtn://g.test/~news");
    assert_eq!(entry.data.subject, "hi");
    assert_eq!(entry.data.body, "body line");
    assert_eq!(entry.data.references, "");
    assert!(entry.error_log.is_empty());

    let frame = rx.recv().await.unwrap();
    assert_eq!(frame.src, entry.source);
    assert_eq!(frame.dst, entry.destination);
    let payload = decode_payload(&frame.data).unwrap();
    assert_eq!(payload, entry.data);
}

#[tokio::test]
async fn post_while_disconnected_logs_error_and_keeps_entry() {
    let backend = backend(&["g.test"]);
    // No stream handle installed: DTND is down.

    backend.spool.post(&post_buffer()).await.unwrap();

    let entries = backend.store.spool_entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.retries, 1);
    let error_lines: Vec<&str> = entry
        .error_log
        .lines()
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(error_lines.len(), 1);
    // 2026-08-01T…  ERROR Failure delivering to DTNd: …
    let line = error_lines[0];
    assert_eq!(&line[4..5], "-");
    assert_eq!(&line[10..11], "T");
    assert!(line.contains(" ERROR Failure delivering to DTNd:"), "{line}");
}

#[tokio::test]
async fn post_to_unknown_group_fails() {
    let backend = backend(&["g.test"]);
    let buffer: Vec<String> = ["Newsgroups: g.elsewhere", "Subject: hi", "", "x"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let err = backend.spool.post(&buffer).await.unwrap_err();
    assert!(matches!(err, SpoolError::UnknownGroup(_)));
    assert_eq!(backend.store.spool_len(), 0);
}

#[tokio::test]
async fn post_compresses_body_when_configured() {
    let mut config = test_config(&["g.test"]);
    config.bundles.compress_body = true;
    let backend = crate::test_support::backend_with_config(config);
    let mut rx = backend.connect_stream();

    backend.spool.post(&post_buffer()).await.unwrap();

    // Spool keeps the text form so the hash matches the acknowledgement.
    let entry = &backend.store.spool_entries()[0];
    assert_eq!(entry.data.body, "body line");

    // The wire payload still decodes to the same text.
    let frame = rx.recv().await.unwrap();
    assert_eq!(decode_payload(&frame.data).unwrap().body, "body line");
}

#[tokio::test]
async fn drain_resends_in_insertion_order() {
    let backend = backend(&["g.test"]);

    // Two posts while disconnected.
    backend.spool.post(&post_buffer()).await.unwrap();
    let second: Vec<String> = ["Newsgroups: g.test", "Subject: again", "", "more"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    backend.spool.post(&second).await.unwrap();
    assert_eq!(backend.store.spool_len(), 2);

    let mut rx = backend.connect_stream();
    backend.spool.drain(CancellationToken::new()).await;

    let first_frame = rx.recv().await.unwrap();
    let second_frame = rx.recv().await.unwrap();
    assert_eq!(decode_payload(&first_frame.data).unwrap().subject, "hi");
    assert_eq!(decode_payload(&second_frame.data).unwrap().subject, "again");

    // Entries stay spooled until an acknowledgement arrives.
    assert_eq!(backend.store.spool_len(), 2);
}

#[tokio::test]
async fn drain_with_empty_spool_returns_immediately() {
    let backend = backend(&["g.test"]);
    // Would hang waiting for a stream if the empty spool were not
    // special-cased.
    backend.spool.drain(CancellationToken::new()).await;
}

#[tokio::test]
async fn drain_stops_on_cancellation_while_waiting() {
    let backend = backend(&["g.test"]);
    backend.spool.post(&post_buffer()).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    backend.spool.drain(cancel).await;
    assert_eq!(backend.store.spool_len(), 1);
}
