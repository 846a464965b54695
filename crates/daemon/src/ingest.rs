// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Bulk ingestion of historic bundles from the DTN daemon.
//!
//! Runs once at startup and again after every stream reconnect: lists the
//! bundles addressed to each carried group, drops the ones whose canonical
//! message-id is already known, downloads and decodes the rest, and
//! commits the whole batch in a single store transaction.

use crate::dtnd::ControlApi;
use bn_core::{bundle_id_to_message_id, email_from_sender_uri, endpoint_group, from_dtn_timestamp};
use bn_storage::{NewArticle, Store, StoreError};
use bn_wire::decode_payload;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Ingest everything the daemon holds for the given groups. Returns the
/// number of newly committed articles.
///
/// Individual bundle failures (listing, download, decode, unknown group)
/// are logged and skipped; only a failed batch commit aborts the run.
pub async fn ingest_all(
    store: &Store,
    control: &dyn ControlApi,
    groups: &[String],
) -> Result<usize, StoreError> {
    info!("ingesting newsgroup bundles from the DTNd bundle store");

    let mut known = store.known_message_ids();

    let mut bundle_ids: BTreeSet<String> = BTreeSet::new();
    for group in groups {
        match control.list_bundles(group).await {
            Ok(ids) => {
                debug!(group, count = ids.len(), "listed bundles for group");
                bundle_ids.extend(ids);
            }
            Err(e) => warn!(group, error = %e, "error listing bundles from the REST interface"),
        }
    }

    let mut batch: Vec<NewArticle> = Vec::new();
    for bundle_id in bundle_ids {
        let message_id = bundle_id_to_message_id(&bundle_id);
        if known.contains(&message_id) {
            debug!(message_id, "duplicate, discarding");
            continue;
        }

        let bundle = match control.download(&bundle_id).await {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(bundle_id, error = %e, "bundle could not be fetched or deserialized");
                continue;
            }
        };

        let group_name = endpoint_group(&bundle.destination);
        let Some(group) = store.group_by_name(&group_name) else {
            // Not carried here; the subscription filter is by substring,
            // so foreign destinations do show up.
            debug!(group_name, bundle_id, "destination group not carried, ignoring");
            continue;
        };

        let payload = match decode_payload(&bundle.payload) {
            Ok(payload) => payload,
            Err(e) => {
                error!(bundle_id, error = %e, "bundle payload could not be decoded");
                continue;
            }
        };

        let from = match email_from_sender_uri(&bundle.source) {
            Ok(from) => from,
            Err(e) => {
                error!(bundle_id, error = %e, "bundle source is not a mail endpoint");
                continue;
            }
        };

        known.insert(message_id.clone());
        batch.push(NewArticle {
            newsgroup_id: group.id,
            from,
            subject: payload.subject,
            body: payload.body,
            message_id,
            references: payload.references,
            created_at: from_dtn_timestamp(bundle.timestamp),
            path: None,
            reply_to: None,
            organization: None,
            user_agent: None,
        });
    }

    if batch.is_empty() {
        debug!("no new bundles to ingest");
        return Ok(0);
    }

    let count = batch.len();
    match store.insert_articles(batch) {
        Ok(articles) => {
            for article in &articles {
                info!(message_id = %article.message_id, "created article from ingested bundle");
            }
            Ok(count)
        }
        Err(e) => {
            error!(
                count,
                error = %e,
                "committing the batch of ingested articles failed; none were stored"
            );
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
