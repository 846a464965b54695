// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use bn_core::FakeClock;
use bn_storage::NewArticle;
use chrono::Utc;
use tempfile::tempdir;

fn article_at(group_id: i64, message_id: &str, created_at: chrono::DateTime<Utc>) -> NewArticle {
    NewArticle {
        newsgroup_id: group_id,
        from: "a@b.c".into(),
        subject: "s".into(),
        body: "b".into(),
        message_id: message_id.into(),
        references: String::new(),
        created_at,
        path: None,
        reply_to: None,
        organization: None,
        user_agent: None,
    }
}

#[test]
fn sweep_deletes_articles_past_the_window() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let group = store.create_group("g.test", None, Utc::now()).unwrap();

    let clock = FakeClock::new();
    clock.set_epoch_ms(10_000);
    let now = clock.now_utc();

    store
        .insert_article(article_at(group.id, "<old@x.dtn>", now - chrono::Duration::seconds(2)))
        .unwrap();
    store.insert_article(article_at(group.id, "<new@x.dtn>", now)).unwrap();

    let deleted = sweep(&store, &clock, Duration::from_secs(1)).unwrap();
    assert_eq!(deleted, 1);
    assert!(!store.contains_message_id("<old@x.dtn>"));
    assert!(store.contains_message_id("<new@x.dtn>"));
}

#[test]
fn zero_expiry_disables_the_sweep() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let group = store.create_group("g.test", None, Utc::now()).unwrap();

    let clock = FakeClock::new();
    clock.set_epoch_ms(10_000);
    store
        .insert_article(article_at(
            group.id,
            "<ancient@x.dtn>",
            clock.now_utc() - chrono::Duration::days(365),
        ))
        .unwrap();

    assert_eq!(sweep(&store, &clock, Duration::ZERO).unwrap(), 0);
    assert!(store.contains_message_id("<ancient@x.dtn>"));
}

#[test]
fn sweep_never_touches_the_spool() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    store
        .insert_spool(
            bn_storage::NewSpoolEntry {
                source: "dtn://n1/mail/b.c/a".into(),
                destination: "dtn://g.test/~news".into(),
                data: bn_core::SpoolPayload::default(),
                delivery_notification: false,
                lifetime_ms: 1,
                hash: "h".into(),
            },
            Utc::now() - chrono::Duration::days(365),
        )
        .unwrap();

    let clock = FakeClock::new();
    clock.set_epoch_ms(4_102_444_800_000); // 2100-01-01
    assert_eq!(sweep(&store, &clock, Duration::from_secs(1)).unwrap(), 0);
    assert_eq!(store.spool_len(), 1);
}

#[tokio::test]
async fn janitor_task_ticks_and_stops_on_cancel() {
    let dir = tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    let group = store.create_group("g.test", None, Utc::now()).unwrap();
    store
        .insert_article(article_at(
            group.id,
            "<old@x.dtn>",
            Utc::now() - chrono::Duration::days(2),
        ))
        .unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run(
        Arc::clone(&store),
        bn_core::SystemClock,
        Duration::from_secs(86_400),
        Duration::from_millis(50),
        cancel.clone(),
    ));

    // Give the 50ms tick time to fire.
    for _ in 0..50 {
        if !store.contains_message_id("<old@x.dtn>") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!store.contains_message_id("<old@x.dtn>"));

    cancel.cancel();
    handle.await.unwrap();
}
