// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Materialized table state and the journal record vocabulary.

use bn_core::{Article, Newsgroup, SpoolEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single committed mutation, as journaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Record {
    GroupCreated { group: Newsgroup },
    GroupDeleted { id: i64 },
    ArticleInserted { article: Article },
    ArticlesDeleted { ids: Vec<i64> },
    SpoolInserted { entry: SpoolEntry },
    SpoolSendFailed { id: i64, line: String },
    SpoolDeleted { ids: Vec<i64> },
}

/// Table state built from snapshot load + journal replay.
///
/// Surrogate id counters are persisted so deleted ids are never reused.
/// The message-id index is derived and rebuilt after recovery.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TableState {
    pub groups: BTreeMap<i64, Newsgroup>,
    pub articles: BTreeMap<i64, Article>,
    pub spool: BTreeMap<i64, SpoolEntry>,
    pub next_group_id: i64,
    pub next_article_id: i64,
    pub next_spool_id: i64,
    /// message-id -> article id index.
    #[serde(skip)]
    pub(crate) message_ids: HashMap<String, i64>,
}

impl TableState {
    /// Apply a record. Records are applied exactly once, in journal order.
    pub fn apply(&mut self, record: &Record) {
        match record {
            Record::GroupCreated { group } => {
                self.next_group_id = self.next_group_id.max(group.id + 1);
                self.groups.insert(group.id, group.clone());
            }
            Record::GroupDeleted { id } => {
                self.groups.remove(id);
            }
            Record::ArticleInserted { article } => {
                self.next_article_id = self.next_article_id.max(article.id + 1);
                self.message_ids.insert(article.message_id.clone(), article.id);
                self.articles.insert(article.id, article.clone());
            }
            Record::ArticlesDeleted { ids } => {
                for id in ids {
                    if let Some(article) = self.articles.remove(id) {
                        self.message_ids.remove(&article.message_id);
                    }
                }
            }
            Record::SpoolInserted { entry } => {
                self.next_spool_id = self.next_spool_id.max(entry.id + 1);
                self.spool.insert(entry.id, entry.clone());
            }
            Record::SpoolSendFailed { id, line } => {
                if let Some(entry) = self.spool.get_mut(id) {
                    entry.error_log.push('\n');
                    entry.error_log.push_str(line);
                    entry.retries += 1;
                }
            }
            Record::SpoolDeleted { ids } => {
                for id in ids {
                    self.spool.remove(id);
                }
            }
        }
    }

    /// Rebuild derived indexes after snapshot load / journal replay.
    pub fn rebuild_indexes(&mut self) {
        self.message_ids = self
            .articles
            .values()
            .map(|a| (a.message_id.clone(), a.id))
            .collect();
        self.next_group_id = self.next_group_id.max(1);
        self.next_article_id = self.next_article_id.max(1);
        self.next_spool_id = self.next_spool_id.max(1);
    }
}
