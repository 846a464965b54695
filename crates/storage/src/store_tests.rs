// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use bn_core::SpoolPayload;
use chrono::{Duration, Utc};
use tempfile::tempdir;

fn new_article(group_id: i64, message_id: &str, subject: &str) -> NewArticle {
    NewArticle {
        newsgroup_id: group_id,
        from: "alice@example.org".into(),
        subject: subject.into(),
        body: "body".into(),
        message_id: message_id.into(),
        references: String::new(),
        created_at: Utc::now(),
        path: None,
        reply_to: None,
        organization: None,
        user_agent: None,
    }
}

fn new_spool(hash: &str) -> NewSpoolEntry {
    NewSpoolEntry {
        source: "dtn://n1/mail/example.org/alice".into(),
        destination: "dtn://g.test/~news".into(),
        data: SpoolPayload { subject: "hi".into(), body: "b".into(), references: String::new() },
        delivery_notification: false,
        lifetime_ms: 1000,
        hash: hash.into(),
    }
}

#[test]
fn groups_are_created_and_listed_in_name_order() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    store.create_group("z.last", None, Utc::now()).unwrap();
    store.create_group("a.first", Some("desc".into()), Utc::now()).unwrap();

    let names: Vec<String> = store.groups().into_iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["a.first", "z.last"]);
    assert!(store.group_by_name("a.first").is_some());
    assert!(store.group_by_name("missing").is_none());
}

#[test]
fn deleting_a_group_cascades_to_its_articles() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let g = store.create_group("g.test", None, Utc::now()).unwrap();
    let other = store.create_group("g.other", None, Utc::now()).unwrap();
    store.insert_article(new_article(g.id, "<1@a.dtn>", "one")).unwrap();
    store.insert_article(new_article(other.id, "<2@a.dtn>", "two")).unwrap();

    store.delete_group("g.test").unwrap();

    assert!(store.group_by_name("g.test").is_none());
    assert!(!store.contains_message_id("<1@a.dtn>"));
    assert!(store.contains_message_id("<2@a.dtn>"));
}

#[test]
fn duplicate_message_id_is_rejected() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();

    store.insert_article(new_article(g.id, "<dup@a.dtn>", "first")).unwrap();
    let err = store.insert_article(new_article(g.id, "<dup@a.dtn>", "second")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateMessageId(_)));
}

#[test]
fn batch_insert_is_all_or_nothing() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();
    store.insert_article(new_article(g.id, "<known@a.dtn>", "x")).unwrap();

    let err = store
        .insert_articles(vec![
            new_article(g.id, "<fresh@a.dtn>", "y"),
            new_article(g.id, "<known@a.dtn>", "z"),
        ])
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateMessageId(_)));
    assert!(!store.contains_message_id("<fresh@a.dtn>"));
}

#[test]
fn article_ids_are_monotone_and_never_reused() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();

    let a1 = store.insert_article(new_article(g.id, "<1@a.dtn>", "s")).unwrap();
    let a2 = store.insert_article(new_article(g.id, "<2@a.dtn>", "s")).unwrap();
    assert!(a2.id > a1.id);

    store.expire_articles_before(Utc::now() + Duration::hours(1)).unwrap();
    let a3 = store.insert_article(new_article(g.id, "<3@a.dtn>", "s")).unwrap();
    assert!(a3.id > a2.id);
}

#[test]
fn range_and_navigation_queries() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();
    let other = store.create_group("g.other", None, Utc::now()).unwrap();

    let a1 = store.insert_article(new_article(g.id, "<1@a.dtn>", "s1")).unwrap();
    let ax = store.insert_article(new_article(other.id, "<x@a.dtn>", "sx")).unwrap();
    let a2 = store.insert_article(new_article(g.id, "<2@a.dtn>", "s2")).unwrap();

    let in_range = store.articles_in_range(g.id, a1.id, a2.id);
    assert_eq!(in_range.len(), 2);

    assert_eq!(store.first_article(g.id).unwrap().id, a1.id);
    assert_eq!(store.article_after(g.id, a1.id).unwrap().id, a2.id);
    assert_eq!(store.article_before(g.id, a2.id).unwrap().id, a1.id);
    assert!(store.article_before(g.id, a1.id).is_none());

    // Other-group articles are invisible through group-scoped queries.
    assert!(store.article_by_number(g.id, ax.id).is_none());

    let stats = store.group_stats(g.id).unwrap();
    assert_eq!(stats, GroupStats { count: 2, low: a1.id, high: a2.id });
    assert!(store.group_stats(999).is_none());

    assert!(store.articles_in_range(g.id, 5, 2).is_empty());
}

#[test]
fn newest_articles_are_sorted_descending() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();

    let old = Utc::now() - Duration::hours(2);
    let mut a = new_article(g.id, "<old@a.dtn>", "old");
    a.created_at = old;
    store.insert_article(a).unwrap();
    store.insert_article(new_article(g.id, "<new@a.dtn>", "new")).unwrap();

    let newest = store.newest_articles(1);
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].message_id, "<new@a.dtn>");
}

#[test]
fn expiry_deletes_only_old_articles_and_spares_spool() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    let g = store.create_group("g.test", None, Utc::now()).unwrap();

    let mut old = new_article(g.id, "<old@a.dtn>", "old");
    old.created_at = Utc::now() - Duration::seconds(2);
    store.insert_article(old).unwrap();
    store.insert_article(new_article(g.id, "<new@a.dtn>", "new")).unwrap();
    store.insert_spool(new_spool("h1"), Utc::now() - Duration::days(30)).unwrap();

    let deleted = store.expire_articles_before(Utc::now() - Duration::seconds(1)).unwrap();
    assert_eq!(deleted, 1);
    assert!(!store.contains_message_id("<old@a.dtn>"));
    assert!(store.contains_message_id("<new@a.dtn>"));
    assert_eq!(store.spool_len(), 1);

    // Nothing left to expire: no commit, count zero.
    assert_eq!(store.expire_articles_before(Utc::now() - Duration::seconds(1)).unwrap(), 0);
}

#[test]
fn spool_entries_keep_insertion_order() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    store.insert_spool(new_spool("h1"), Utc::now()).unwrap();
    store.insert_spool(new_spool("h2"), Utc::now()).unwrap();
    store.insert_spool(new_spool("h3"), Utc::now()).unwrap();

    let hashes: Vec<String> = store.spool_entries().into_iter().map(|e| e.hash).collect();
    assert_eq!(hashes, vec!["h1", "h2", "h3"]);
}

#[test]
fn spool_error_log_appends_and_bumps_retries() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.insert_spool(new_spool("h1"), Utc::now()).unwrap();

    store.log_spool_error("h1", "2026-01-01T00:00:00 ERROR Failure delivering to DTNd: down").unwrap();
    store.log_spool_error("h1", "2026-01-01T00:00:01 ERROR Failure delivering to DTNd: down").unwrap();

    let entry = &store.spool_entries()[0];
    assert_eq!(entry.retries, 2);
    assert_eq!(entry.error_log.lines().filter(|l| l.contains("ERROR Failure")).count(), 2);

    assert!(matches!(
        store.log_spool_error("missing", "x"),
        Err(StoreError::MissingSpoolEntry(_))
    ));
}

#[test]
fn delete_spool_by_hash_counts() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store.insert_spool(new_spool("h1"), Utc::now()).unwrap();
    store.insert_spool(new_spool("h1"), Utc::now()).unwrap();
    store.insert_spool(new_spool("h2"), Utc::now()).unwrap();

    assert_eq!(store.delete_spool_by_hash("h1").unwrap(), 2);
    assert_eq!(store.delete_spool_by_hash("h1").unwrap(), 0);
    assert_eq!(store.spool_len(), 1);
}

#[test]
fn state_survives_reopen_via_journal_replay() {
    let dir = tempdir().unwrap();
    {
        let store = Store::open(dir.path()).unwrap();
        let g = store.create_group("g.test", None, Utc::now()).unwrap();
        store.insert_article(new_article(g.id, "<1@a.dtn>", "s")).unwrap();
        store.insert_spool(new_spool("h1"), Utc::now()).unwrap();
        // No checkpoint: recovery must come from the journal alone.
    }

    let store = Store::open(dir.path()).unwrap();
    assert!(store.group_by_name("g.test").is_some());
    assert!(store.contains_message_id("<1@a.dtn>"));
    assert_eq!(store.spool_len(), 1);
}

#[test]
fn state_survives_reopen_via_checkpoint() {
    let dir = tempdir().unwrap();
    {
        let store = Store::open(dir.path()).unwrap();
        let g = store.create_group("g.test", None, Utc::now()).unwrap();
        store.insert_article(new_article(g.id, "<1@a.dtn>", "s")).unwrap();
        store.checkpoint().unwrap();
        // Post-checkpoint write lands in the fresh journal.
        store.insert_article(new_article(g.id, "<2@a.dtn>", "s")).unwrap();
    }

    let store = Store::open(dir.path()).unwrap();
    assert!(store.contains_message_id("<1@a.dtn>"));
    assert!(store.contains_message_id("<2@a.dtn>"));

    // Ids keep advancing after recovery.
    let g = store.group_by_name("g.test").unwrap();
    let a3 = store.insert_article(new_article(g.id, "<3@a.dtn>", "s")).unwrap();
    assert!(a3.id > store.article_by_message_id("<2@a.dtn>").unwrap().id);
}
