// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Identity mapping between NNTP and BP7 naming.
//!
//! These are the only translation rules in the system; the ingestion and
//! backchannel paths both go through [`bundle_id_to_message_id`], so
//! deduplication against the store's `message_id` column is sufficient.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from identity translation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("'{0}' does not look like an email address")]
    InvalidEmail(String),

    #[error("'{0}' is not a BP7 endpoint URI")]
    InvalidEndpoint(String),

    #[error("'{0}' is not a well-formed bundle id")]
    InvalidBundleId(String),
}

/// Newsgroup name to the BP7 endpoint articles for it are addressed to.
pub fn group_endpoint(group: &str) -> String {
    format!("dtn://{group}/~news")
}

/// Extract the group name from a `dtn://<group>/~news` endpoint.
///
/// Mirrors [`group_endpoint`]; tolerates a bare `//` prefix as emitted by
/// some daemons.
pub fn endpoint_group(endpoint: &str) -> String {
    strip_scheme(endpoint)
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Build the BP7 sender URI for a local email address.
///
/// `node_id` is the daemon-reported node id and keeps its trailing slash,
/// so the result is `dtn://<node>/mail/<domain>/<name>`.
pub fn sender_uri_for_email(node_id: &str, email: &str) -> Result<String, MapError> {
    let (name, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| MapError::InvalidEmail(email.to_string()))?;
    Ok(format!("{node_id}mail/{domain}/{name}"))
}

/// Recover `name@domain` from a BP7 sender URI.
///
/// The last path segment is the mailbox name, the second-to-last the
/// domain: `dtn://n1/mail/example.org/alice` -> `alice@example.org`.
pub fn email_from_sender_uri(uri: &str) -> Result<String, MapError> {
    if !uri.starts_with("dtn://") && !uri.starts_with("//") {
        return Err(MapError::InvalidEndpoint(uri.to_string()));
    }
    let segments: Vec<&str> = strip_scheme(uri).split('/').collect();
    match segments.as_slice() {
        [.., domain, name] if !domain.is_empty() && !name.is_empty() => {
            Ok(format!("{name}@{domain}"))
        }
        _ => Err(MapError::InvalidEndpoint(uri.to_string())),
    }
}

/// Split a bundle id `<src>-<ts>-<seq>` into its three parts.
///
/// The source URI may itself contain `-`, so the split is from the right.
pub fn split_bundle_id(bid: &str) -> Result<(&str, &str, &str), MapError> {
    let mut it = bid.rsplitn(3, '-');
    let seq = it.next().unwrap_or_default();
    let ts = it.next().unwrap_or_default();
    let src = it.next().unwrap_or_default();
    if src.is_empty() || ts.is_empty() || seq.is_empty() {
        return Err(MapError::InvalidBundleId(bid.to_string()));
    }
    Ok((src, ts, seq))
}

/// Canonical message-id for a bundle id: `<ts-seq@src.dtn>` with the
/// source URI flattened (`dtn://` and `//` removed, `/` replaced by `-`).
///
/// Total over all inputs: a bundle id without the expected shape maps to an
/// id with the whole string as the source part. Both the ingestion and
/// backchannel paths use this function.
pub fn bundle_id_to_message_id(bid: &str) -> String {
    let (src, ts, seq) = split_bundle_id(bid).unwrap_or((bid, "", ""));
    let src_like = strip_scheme(src).replace('/', "-");
    format!("<{ts}-{seq}@{src_like}.dtn>")
}

/// Spool hash: hex SHA-256 over the five identifying fields.
///
/// The body must be the decompressed text form on both the post and the
/// acknowledgement path, otherwise the hashes diverge and spooled entries
/// are never reclaimed.
pub fn spool_hash(
    source: &str,
    destination: &str,
    subject: &str,
    body: &str,
    references: &str,
) -> String {
    let canonical = format!("{source}+{destination}+{subject}+{body}+{references}");
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

fn strip_scheme(uri: &str) -> &str {
    let uri = uri.strip_prefix("dtn://").unwrap_or(uri);
    uri.strip_prefix("//").unwrap_or(uri)
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
