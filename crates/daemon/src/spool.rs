// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! The outbound spool engine.
//!
//! Every posted article is written to the spool in its own commit before
//! any transmission is attempted, which is what makes delivery
//! at-least-once across daemon outages. Send failures are never fatal:
//! they append a line to the entry's error log and the entry waits for the
//! next drain.

use crate::config::Config;
use crate::dtnd::{DtndError, DtndHandles};
use bn_core::{group_endpoint, sender_uri_for_email, spool_hash, MapError, SpoolPayload};
use bn_storage::{NewSpoolEntry, Store, StoreError};
use bn_wire::{encode_payload, parse_article, CodecError, OutboundFrame};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors surfaced to the NNTP session as `503`.
#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("article names no newsgroup carried by this server: '{0}'")]
    UnknownGroup(String),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Spool {
    store: Arc<Store>,
    handles: Arc<DtndHandles>,
    config: Arc<Config>,
}

impl Spool {
    pub fn new(store: Arc<Store>, handles: Arc<DtndHandles>, config: Arc<Config>) -> Self {
        Self { store, handles, config }
    }

    /// Accept a raw article buffer from an NNTP session: parse it, write a
    /// spool entry, then attempt transmission. The sender identity always
    /// comes from configuration, never from the `From:` header.
    pub async fn post(&self, article_lines: &[String]) -> Result<(), SpoolError> {
        let parsed = parse_article(article_lines);
        let group_name = parsed.header("newsgroups");
        let group = self
            .store
            .group_by_name(group_name)
            .ok_or_else(|| SpoolError::UnknownGroup(group_name.to_string()))?;

        let payload = SpoolPayload {
            subject: parsed.header("subject").to_string(),
            body: parsed.body.clone(),
            references: parsed.header("references").to_string(),
        };

        let source = sender_uri_for_email(&self.node_id(), &self.config.usenet.email)?;
        let destination = group_endpoint(&group.name);
        let hash = spool_hash(&source, &destination, &payload.subject, &payload.body, &payload.references);

        // Encode before spooling so an unencodable article fails the POST
        // instead of leaving a dead spool entry.
        let data = encode_payload(&payload, self.config.bundles.compress_body)?;

        let entry = self.store.insert_spool(
            NewSpoolEntry {
                source: source.clone(),
                destination: destination.clone(),
                data: payload,
                delivery_notification: self.config.bundles.delivery_notification,
                lifetime_ms: self.config.bundles.lifetime_ms(),
                hash: hash.clone(),
            },
            Utc::now(),
        )?;
        debug!(id = entry.id, hash, "created spool entry");

        let frame = OutboundFrame {
            src: source,
            dst: destination,
            delivery_notification: entry.delivery_notification,
            lifetime_ms: entry.lifetime_ms,
            data,
        };
        self.send_or_log(frame, &hash).await;
        Ok(())
    }

    /// Re-send every spool entry in insertion order. Waits until the
    /// stream channel is up; yields between sends so a large spool does
    /// not starve other tasks. Idempotent with respect to the article
    /// store: duplicate acknowledgements are rejected by the reconciler.
    pub async fn drain(&self, cancel: CancellationToken) {
        let entries = self.store.spool_entries();
        if entries.is_empty() {
            return;
        }
        if self
            .handles
            .wait_stream(self.config.backoff.constant_wait(), &cancel)
            .await
            .is_none()
        {
            return;
        }

        info!(count = entries.len(), "sending spooled messages to DTNd");
        for entry in &entries {
            if cancel.is_cancelled() {
                return;
            }
            let data = match encode_payload(&entry.data, self.config.bundles.compress_body) {
                Ok(data) => data,
                Err(e) => {
                    warn!(hash = %entry.hash, error = %e, "skipping unencodable spool entry");
                    continue;
                }
            };
            let frame = OutboundFrame {
                src: entry.source.clone(),
                dst: entry.destination.clone(),
                delivery_notification: entry.delivery_notification,
                lifetime_ms: entry.lifetime_ms,
                data,
            };
            self.send_or_log(frame, &entry.hash).await;
            tokio::task::yield_now().await;
        }
        info!(count = entries.len(), "done sending spooled messages to DTNd");
    }

    /// Transmit via the current stream handle; on any failure append an
    /// error line to the spool entry and carry on.
    async fn send_or_log(&self, frame: OutboundFrame, hash: &str) {
        let result = match self.handles.stream() {
            Some(handle) => handle.send(frame).await,
            None => Err(DtndError::Transient(
                "no current connection to the stream client; article is in spool and will be sent on reconnect".to_string(),
            )),
        };

        if let Err(e) = result {
            debug!(hash, "could not reach DTNd, logging error on spool entry");
            let line = format!(
                "{} ERROR Failure delivering to DTNd: {e}",
                Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f")
            );
            if let Err(log_err) = self.store.log_spool_error(hash, &line) {
                warn!(hash, error = %log_err, "could not update spool entry error log");
            }
        }
    }

    /// Node id for sender URIs: the live daemon value when the control
    /// channel is up, the configured fallback otherwise.
    fn node_id(&self) -> String {
        match self.handles.control() {
            Some(control) => control.node_id().to_string(),
            None => {
                error!(
                    "DTNd not online yet, using node id from configuration; this may misbehave if the daemon reports a different id later"
                );
                self.config.dtnd.node_id.clone()
            }
        }
    }
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
