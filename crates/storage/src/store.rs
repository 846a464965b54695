// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! The transactional store facade.
//!
//! All reads and writes go through [`Store`]. Writes validate against the
//! in-memory tables under the lock, journal the record batch, flush, and
//! only then apply, so a batch is either fully durable or absent.

use crate::journal::Journal;
use crate::snapshot::{load_snapshot, Snapshot};
use crate::state::{Record, TableState};
use bn_core::{Article, Newsgroup, SpoolEntry, SpoolPayload};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate message-id {0}")]
    DuplicateMessageId(String),

    #[error("no such newsgroup '{0}'")]
    NoSuchGroup(String),

    #[error("no spool entry with hash {0}")]
    MissingSpoolEntry(String),
}

/// An article to be committed (ids and numbering assigned by the store).
#[derive(Debug, Clone)]
pub struct NewArticle {
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

/// A spool entry to be committed.
#[derive(Debug, Clone)]
pub struct NewSpoolEntry {
    pub source: String,
    pub destination: String,
    pub data: SpoolPayload,
    pub delivery_notification: bool,
    pub lifetime_ms: u64,
    pub hash: String,
}

/// Per-group article statistics for GROUP / LIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub count: i64,
    pub low: i64,
    pub high: i64,
}

struct Inner {
    state: TableState,
    journal: Journal,
    snapshot_path: PathBuf,
}

/// The article store. Cheap to share behind an `Arc`; every operation
/// takes the internal lock for the duration of the call.
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    /// Open the store rooted at `dir`, creating it if needed. Loads the
    /// latest snapshot and replays journal records past its sequence.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let snapshot_path = dir.join("snapshot.zst");
        let journal_path = dir.join("store.journal");

        let (mut state, snapshot_seq) = match load_snapshot(&snapshot_path)? {
            Some(snapshot) => {
                info!(
                    seq = snapshot.seq,
                    groups = snapshot.state.groups.len(),
                    articles = snapshot.state.articles.len(),
                    "loaded store snapshot"
                );
                (snapshot.state, snapshot.seq)
            }
            None => (TableState::default(), 0),
        };

        let journal = Journal::open(&journal_path)?;
        let mut replayed = 0usize;
        for entry in journal.entries()? {
            if entry.seq > snapshot_seq {
                state.apply(&entry.record);
                replayed += 1;
            }
        }
        if replayed > 0 {
            debug!(replayed, after_seq = snapshot_seq, "replayed journal records");
        }
        state.rebuild_indexes();

        Ok(Self { inner: Mutex::new(Inner { state, journal, snapshot_path }) })
    }

    /// Snapshot the current state and truncate the journal.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let seq = inner.journal.write_seq();
        let snapshot = Snapshot::new(seq, inner.state.clone(), Utc::now());
        snapshot.save(&inner.snapshot_path)?;
        inner.journal.reset()?;
        debug!(seq, "store checkpoint written");
        Ok(())
    }

    // ---- newsgroups -----------------------------------------------------

    pub fn create_group(
        &self,
        name: &str,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Newsgroup, StoreError> {
        let mut inner = self.inner.lock();
        let group = Newsgroup {
            id: inner.state.next_group_id,
            name: name.to_string(),
            description,
            created_at,
        };
        commit(&mut inner, vec![Record::GroupCreated { group: group.clone() }])?;
        Ok(group)
    }

    /// Delete a group and, cascading, all its articles.
    pub fn delete_group(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let group = find_group(&inner.state, name)
            .ok_or_else(|| StoreError::NoSuchGroup(name.to_string()))?;
        let article_ids: Vec<i64> = inner
            .state
            .articles
            .values()
            .filter(|a| a.newsgroup_id == group.id)
            .map(|a| a.id)
            .collect();
        let mut records = Vec::new();
        if !article_ids.is_empty() {
            records.push(Record::ArticlesDeleted { ids: article_ids });
        }
        records.push(Record::GroupDeleted { id: group.id });
        commit(&mut inner, records)
    }

    /// All groups, name order.
    pub fn groups(&self) -> Vec<Newsgroup> {
        let inner = self.inner.lock();
        let mut groups: Vec<Newsgroup> = inner.state.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    pub fn group_by_name(&self, name: &str) -> Option<Newsgroup> {
        find_group(&self.inner.lock().state, name)
    }

    pub fn group_by_id(&self, id: i64) -> Option<Newsgroup> {
        self.inner.lock().state.groups.get(&id).cloned()
    }

    /// Groups created at or after `since`, name order.
    pub fn groups_since(&self, since: DateTime<Utc>) -> Vec<Newsgroup> {
        let inner = self.inner.lock();
        let mut groups: Vec<Newsgroup> = inner
            .state
            .groups
            .values()
            .filter(|g| g.created_at >= since)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }

    // ---- articles -------------------------------------------------------

    /// Insert one article. A `message_id` already in the store is an
    /// integrity error; callers treat it as the designed dedup path.
    pub fn insert_article(&self, new: NewArticle) -> Result<Article, StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.message_ids.contains_key(&new.message_id) {
            return Err(StoreError::DuplicateMessageId(new.message_id));
        }
        let article = materialize(new, inner.state.next_article_id);
        commit(&mut inner, vec![Record::ArticleInserted { article: article.clone() }])?;
        Ok(article)
    }

    /// Insert a batch of articles in one commit: either every article
    /// becomes durable or none does.
    pub fn insert_articles(&self, batch: Vec<NewArticle>) -> Result<Vec<Article>, StoreError> {
        let mut inner = self.inner.lock();
        let mut seen: HashSet<String> = HashSet::new();
        for new in &batch {
            if inner.state.message_ids.contains_key(&new.message_id)
                || !seen.insert(new.message_id.clone())
            {
                return Err(StoreError::DuplicateMessageId(new.message_id.clone()));
            }
        }
        let mut next_id = inner.state.next_article_id;
        let mut articles = Vec::with_capacity(batch.len());
        let mut records = Vec::with_capacity(batch.len());
        for new in batch {
            let article = materialize(new, next_id);
            next_id += 1;
            records.push(Record::ArticleInserted { article: article.clone() });
            articles.push(article);
        }
        commit(&mut inner, records)?;
        Ok(articles)
    }

    pub fn article_by_id(&self, id: i64) -> Option<Article> {
        self.inner.lock().state.articles.get(&id).cloned()
    }

    /// Article by number within a group (numbers are store ids).
    pub fn article_by_number(&self, group_id: i64, number: i64) -> Option<Article> {
        self.inner
            .lock()
            .state
            .articles
            .get(&number)
            .filter(|a| a.newsgroup_id == group_id)
            .cloned()
    }

    pub fn article_by_message_id(&self, message_id: &str) -> Option<Article> {
        let inner = self.inner.lock();
        inner
            .state
            .message_ids
            .get(message_id)
            .and_then(|id| inner.state.articles.get(id))
            .cloned()
    }

    pub fn contains_message_id(&self, message_id: &str) -> bool {
        self.inner.lock().state.message_ids.contains_key(message_id)
    }

    pub fn known_message_ids(&self) -> HashSet<String> {
        self.inner.lock().state.message_ids.keys().cloned().collect()
    }

    /// Articles of a group with `low <= id <= high`, id order.
    pub fn articles_in_range(&self, group_id: i64, low: i64, high: i64) -> Vec<Article> {
        if high < low {
            return Vec::new();
        }
        let inner = self.inner.lock();
        inner
            .state
            .articles
            .range(low..=high)
            .map(|(_, a)| a)
            .filter(|a| a.newsgroup_id == group_id)
            .cloned()
            .collect()
    }

    pub fn first_article(&self, group_id: i64) -> Option<Article> {
        let inner = self.inner.lock();
        inner
            .state
            .articles
            .values()
            .find(|a| a.newsgroup_id == group_id)
            .cloned()
    }

    /// Highest-numbered article below `id` in the group.
    pub fn article_before(&self, group_id: i64, id: i64) -> Option<Article> {
        let inner = self.inner.lock();
        inner
            .state
            .articles
            .range(..id)
            .rev()
            .map(|(_, a)| a)
            .find(|a| a.newsgroup_id == group_id)
            .cloned()
    }

    /// Lowest-numbered article above `id` in the group.
    pub fn article_after(&self, group_id: i64, id: i64) -> Option<Article> {
        let inner = self.inner.lock();
        inner
            .state
            .articles
            .range(id + 1..)
            .map(|(_, a)| a)
            .find(|a| a.newsgroup_id == group_id)
            .cloned()
    }

    pub fn group_stats(&self, group_id: i64) -> Option<GroupStats> {
        let inner = self.inner.lock();
        let mut stats: Option<GroupStats> = None;
        for article in inner.state.articles.values() {
            if article.newsgroup_id != group_id {
                continue;
            }
            let entry = stats.get_or_insert(GroupStats { count: 0, low: article.id, high: article.id });
            entry.count += 1;
            entry.low = entry.low.min(article.id);
            entry.high = entry.high.max(article.id);
        }
        stats
    }

    /// The most recently created articles across all groups, newest first.
    pub fn newest_articles(&self, limit: usize) -> Vec<Article> {
        let inner = self.inner.lock();
        let mut articles: Vec<Article> = inner.state.articles.values().cloned().collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        articles.truncate(limit);
        articles
    }

    /// Articles created at or after `since`, id order.
    pub fn articles_since(&self, since: DateTime<Utc>) -> Vec<Article> {
        let inner = self.inner.lock();
        inner
            .state
            .articles
            .values()
            .filter(|a| a.created_at >= since)
            .cloned()
            .collect()
    }

    /// Highest article id in the store (upper bound for open ranges).
    pub fn max_article_id(&self) -> i64 {
        self.inner
            .lock()
            .state
            .articles
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// Delete articles created before `cutoff`; returns the count.
    pub fn expire_articles_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let ids: Vec<i64> = inner
            .state
            .articles
            .values()
            .filter(|a| a.created_at < cutoff)
            .map(|a| a.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }
        let count = ids.len();
        commit(&mut inner, vec![Record::ArticlesDeleted { ids }])?;
        Ok(count)
    }

    // ---- spool ----------------------------------------------------------

    pub fn insert_spool(
        &self,
        new: NewSpoolEntry,
        created_at: DateTime<Utc>,
    ) -> Result<SpoolEntry, StoreError> {
        let mut inner = self.inner.lock();
        let entry = SpoolEntry {
            id: inner.state.next_spool_id,
            source: new.source,
            destination: new.destination,
            data: new.data,
            delivery_notification: new.delivery_notification,
            lifetime_ms: new.lifetime_ms,
            hash: new.hash,
            retries: 0,
            error_log: String::new(),
            created_at,
        };
        commit(&mut inner, vec![Record::SpoolInserted { entry: entry.clone() }])?;
        Ok(entry)
    }

    /// All spool entries in insertion order.
    pub fn spool_entries(&self) -> Vec<SpoolEntry> {
        self.inner.lock().state.spool.values().cloned().collect()
    }

    pub fn spool_len(&self) -> usize {
        self.inner.lock().state.spool.len()
    }

    /// Append a delivery-failure line to the entry with the given hash and
    /// bump its retry counter.
    pub fn log_spool_error(&self, hash: &str, line: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let id = inner
            .state
            .spool
            .values()
            .find(|e| e.hash == hash)
            .map(|e| e.id)
            .ok_or_else(|| StoreError::MissingSpoolEntry(hash.to_string()))?;
        commit(&mut inner, vec![Record::SpoolSendFailed { id, line: line.to_string() }])
    }

    /// Delete every spool entry with the given hash; returns the count.
    pub fn delete_spool_by_hash(&self, hash: &str) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let ids: Vec<i64> = inner
            .state
            .spool
            .values()
            .filter(|e| e.hash == hash)
            .map(|e| e.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }
        let count = ids.len();
        commit(&mut inner, vec![Record::SpoolDeleted { ids }])?;
        Ok(count)
    }
}

/// Journal the batch (append + flush), then apply. Nothing is applied on a
/// journal failure, so the in-memory state never runs ahead of disk.
fn commit(inner: &mut Inner, records: Vec<Record>) -> Result<(), StoreError> {
    for record in &records {
        inner.journal.append(record)?;
    }
    inner.journal.flush()?;
    for record in &records {
        inner.state.apply(record);
    }
    Ok(())
}

fn find_group(state: &TableState, name: &str) -> Option<Newsgroup> {
    state.groups.values().find(|g| g.name == name).cloned()
}

fn materialize(new: NewArticle, id: i64) -> Article {
    Article {
        id,
        newsgroup_id: new.newsgroup_id,
        from: new.from,
        subject: new.subject,
        body: new.body,
        message_id: new.message_id,
        references: new.references,
        created_at: new.created_at,
        path: new.path,
        reply_to: new.reply_to,
        organization: new.organization,
        user_agent: new.user_agent,
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
