// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Core domain types for the bundlenews gateway.
//!
//! Everything here is pure data and pure functions: the article/newsgroup/
//! spool records shared by the storage and daemon crates, the identity
//! mapping between NNTP and BP7 naming, DTN timestamp conversion, and the
//! clock abstraction used to make time-dependent code testable.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod article;
mod clock;
mod dtntime;
mod mapping;

pub use article::{Article, Newsgroup, SpoolEntry, SpoolPayload};
pub use clock::{Clock, FakeClock, SystemClock};
pub use dtntime::{from_dtn_timestamp, to_dtn_timestamp, DTN_EPOCH_UNIX_MS};
pub use mapping::{
    bundle_id_to_message_id, email_from_sender_uri, endpoint_group, group_endpoint,
    sender_uri_for_email, split_bundle_id, spool_hash, MapError,
};
