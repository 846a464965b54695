// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! The backchannel reconciler.
//!
//! A single worker consumes stream frames in wire order. Text frames are
//! status lines and are only logged. Each binary frame is a bundle
//! acknowledgement: it is promoted to an article (a duplicate message-id
//! means the frame was already handled and is dropped), and on success the
//! matching spool entries are reclaimed by hash.

use bn_core::{
    bundle_id_to_message_id, email_from_sender_uri, endpoint_group, from_dtn_timestamp,
    split_bundle_id, spool_hash,
};
use bn_storage::{NewArticle, Store, StoreError};
use bn_wire::{decode_payload, AckFrame, StreamFrame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct Reconciler {
    store: Arc<Store>,
    /// Local hostname, recorded in the Path header of promoted articles.
    hostname: String,
}

impl Reconciler {
    pub fn new(store: Arc<Store>, hostname: String) -> Self {
        Self { store, hostname }
    }

    /// Worker loop; frames are processed strictly in channel order.
    pub async fn run(self, mut rx: mpsc::Receiver<StreamFrame>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                frame = rx.recv() => match frame {
                    Some(frame) => self.handle_frame(frame),
                    None => return,
                },
                _ = cancel.cancelled() => return,
            }
        }
    }

    pub fn handle_frame(&self, frame: StreamFrame) {
        match frame {
            StreamFrame::Status(line) => handle_status(&line),
            StreamFrame::Ack(ack) => self.handle_ack(&ack),
        }
    }

    /// Promote one acknowledged bundle into an article.
    pub fn handle_ack(&self, ack: &AckFrame) {
        debug!(bid = %ack.bid, "mapping BP7 acknowledgement to NNTP fields");

        let from = match email_from_sender_uri(&ack.src) {
            Ok(from) => from,
            Err(e) => {
                warn!(src = %ack.src, error = %e, "acknowledgement source is not a mail endpoint, skipping");
                return;
            }
        };

        let group_name = endpoint_group(&ack.dst);
        let Some(group) = self.store.group_by_name(&group_name) else {
            warn!(group_name, "acknowledgement for a group not carried here, skipping");
            return;
        };

        let created_at = match split_bundle_id(&ack.bid) {
            Ok((_, ts, _)) => from_dtn_timestamp(ts.parse().unwrap_or(0)),
            Err(e) => {
                warn!(bid = %ack.bid, error = %e, "unparseable bundle id timestamp, using DTN epoch");
                from_dtn_timestamp(0)
            }
        };
        let message_id = bundle_id_to_message_id(&ack.bid);

        let payload = match decode_payload(&ack.data) {
            Ok(payload) => payload,
            Err(e) => {
                // Permanent decode failure: the frame is skipped, the
                // channel stays up.
                error!(bid = %ack.bid, error = %e, "acknowledgement payload could not be decoded");
                return;
            }
        };

        let article = NewArticle {
            newsgroup_id: group.id,
            from,
            subject: payload.subject.clone(),
            body: payload.body.clone(),
            message_id: message_id.clone(),
            references: payload.references.clone(),
            created_at,
            path: Some(format!("!{}", self.hostname)),
            reply_to: None,
            organization: None,
            user_agent: None,
        };

        match self.store.insert_article(article) {
            Ok(article) => {
                info!(
                    id = article.id,
                    message_id = %article.message_id,
                    subject = %article.subject,
                    "created article from acknowledged bundle"
                );
            }
            Err(StoreError::DuplicateMessageId(_)) => {
                // The designed dedup path: a re-sent spool entry or a
                // replayed frame acknowledges an article we already hold.
                warn!(message_id, "duplicate acknowledgement, no new article created");
                return;
            }
            Err(e) => {
                error!(message_id, error = %e, "could not commit acknowledged article");
                return;
            }
        }

        // Reclaim the spool entry that produced this bundle, if any. The
        // hash is computed over the decompressed payload on both sides.
        let hash = spool_hash(&ack.src, &ack.dst, &payload.subject, &payload.body, &payload.references);
        match self.store.delete_spool_by_hash(&hash) {
            Ok(1) => info!(hash, "removed spool entry"),
            Ok(0) => debug!(message_id, "article has remote origin, no spool entry removed"),
            Ok(n) => error!(hash, deleted = n, "expected exactly one spool entry for hash"),
            Err(e) => warn!(hash, error = %e, "could not delete spool entries"),
        }
    }
}

/// Status lines: three-digit class decides the log level.
pub fn handle_status(line: &str) {
    if line.starts_with('4') {
        info!(line, "client-caused error from DTNd");
    } else if line.starts_with('5') {
        error!(line, "server-side error from DTNd");
    } else {
        debug!(line, "status message from DTNd");
    }
}

#[cfg(test)]
#[path = "backchannel_tests.rs"]
mod tests;
