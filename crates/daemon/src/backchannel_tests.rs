// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use crate::test_support::backend;
use bn_core::SpoolPayload;
use bn_wire::encode_payload;

fn reconciler(store: &Arc<Store>) -> Reconciler {
    Reconciler::new(Arc::clone(store), "news.test".to_string())
}

fn ack(src: &str, dst: &str, bid: &str, payload: &SpoolPayload, compressed: bool) -> AckFrame {
    AckFrame {
        src: src.to_string(),
        dst: dst.to_string(),
        bid: bid.to_string(),
        data: encode_payload(payload, compressed).unwrap(),
    }
}

#[tokio::test]
async fn acknowledgement_promotes_spool_entry_to_article() {
    let backend = backend(&["g.test"]);
    let buffer: Vec<String> = ["Newsgroups: g.test", "Subject: hi", "", "body line"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    backend.spool.post(&buffer).await.unwrap();
    assert_eq!(backend.store.spool_len(), 1);

    let payload = SpoolPayload {
        subject: "hi".into(),
        body: "body line".into(),
        references: String::new(),
    };
    reconciler(&backend.store).handle_ack(&ack(
        "dtn://n1/mail/example.org/alice",
        "dtn://g.test/~news",
        "dtn://n1/mail/example.org/alice-1700000000-7",
        &payload,
        false,
    ));

    // Exactly one article, spool reclaimed.
    let article = backend
        .store
        .article_by_message_id("<1700000000-7@n1-mail-example.org-alice.dtn>")
        .unwrap();
    assert_eq!(article.from, "alice@example.org");
    assert_eq!(article.subject, "hi");
    assert_eq!(article.body, "body line");
    assert_eq!(article.path.as_deref(), Some("!news.test"));
    let group = backend.store.group_by_id(article.newsgroup_id).unwrap();
    assert_eq!(group.name, "g.test");
    assert_eq!(backend.store.spool_len(), 0);
}

#[tokio::test]
async fn remote_article_deletes_no_spool_entries() {
    let backend = backend(&["g.test"]);

    let payload = SpoolPayload {
        subject: "hello".into(),
        body: "hi".into(),
        references: String::new(),
    };
    reconciler(&backend.store).handle_ack(&ack(
        "dtn://n2/mail/other.org/bob",
        "dtn://g.test/~news",
        "dtn://n2/mail/other.org/bob-1700000100-2",
        &payload,
        false,
    ));

    let article = backend
        .store
        .article_by_message_id("<1700000100-2@n2-mail-other.org-bob.dtn>")
        .unwrap();
    assert_eq!(article.from, "bob@other.org");
    assert_eq!(backend.store.spool_len(), 0);
}

#[tokio::test]
async fn duplicate_acknowledgement_is_dropped_without_error() {
    let backend = backend(&["g.test"]);
    let reconciler = reconciler(&backend.store);
    let payload = SpoolPayload {
        subject: "s".into(),
        body: "b".into(),
        references: String::new(),
    };
    let frame = ack(
        "dtn://n2/mail/other.org/bob",
        "dtn://g.test/~news",
        "dtn://n2/mail/other.org/bob-1-1",
        &payload,
        false,
    );

    reconciler.handle_ack(&frame);
    reconciler.handle_ack(&frame);

    assert_eq!(backend.store.newest_articles(10).len(), 1);
}

#[tokio::test]
async fn compressed_acknowledgement_hashes_over_inflated_body() {
    let mut config = crate::test_support::test_config(&["g.test"]);
    config.bundles.compress_body = true;
    let backend = crate::test_support::backend_with_config(config);

    let buffer: Vec<String> = ["Newsgroups: g.test", "Subject: hi", "", "body line"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    backend.spool.post(&buffer).await.unwrap();

    // The acknowledgement carries the compressed wire payload; the spool
    // hash must still match because both sides hash the text form.
    let payload = SpoolPayload {
        subject: "hi".into(),
        body: "body line".into(),
        references: String::new(),
    };
    reconciler(&backend.store).handle_ack(&ack(
        "dtn://n1/mail/example.org/alice",
        "dtn://g.test/~news",
        "dtn://n1/mail/example.org/alice-5-1",
        &payload,
        true,
    ));

    assert_eq!(backend.store.spool_len(), 0);
}

#[tokio::test]
async fn unknown_group_and_bad_payload_are_skipped() {
    let backend = backend(&["g.test"]);
    let reconciler = reconciler(&backend.store);
    let payload = SpoolPayload::default();

    reconciler.handle_ack(&ack(
        "dtn://n2/mail/other.org/bob",
        "dtn://g.elsewhere/~news",
        "dtn://n2/mail/other.org/bob-2-1",
        &payload,
        false,
    ));
    assert!(backend.store.newest_articles(10).is_empty());

    reconciler.handle_ack(&AckFrame {
        src: "dtn://n2/mail/other.org/bob".into(),
        dst: "dtn://g.test/~news".into(),
        bid: "dtn://n2/mail/other.org/bob-3-1".into(),
        data: vec![0xff, 0x00],
    });
    assert!(backend.store.newest_articles(10).is_empty());
}

#[tokio::test]
async fn worker_preserves_frame_order() {
    let backend = backend(&["g.test"]);
    let reconciler = reconciler(&backend.store);
    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let worker = tokio::spawn(reconciler.run(rx, cancel.clone()));

    for n in 0..3u64 {
        let payload = SpoolPayload {
            subject: format!("s{n}"),
            body: "b".into(),
            references: String::new(),
        };
        tx.send(StreamFrame::Ack(ack(
            "dtn://n2/mail/other.org/bob",
            "dtn://g.test/~news",
            &format!("dtn://n2/mail/other.org/bob-{n}-1"),
            &payload,
            false,
        )))
        .await
        .unwrap();
    }
    tx.send(StreamFrame::Status("200 tx ok".into())).await.unwrap();
    drop(tx);
    worker.await.unwrap();

    // Article ids reflect arrival order.
    let mut articles = backend.store.newest_articles(10);
    articles.sort_by_key(|a| a.id);
    let subjects: Vec<String> = articles.into_iter().map(|a| a.subject).collect();
    assert_eq!(subjects, vec!["s0", "s1", "s2"]);
}
