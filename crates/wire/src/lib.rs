// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Protocol surfaces for the bundlenews gateway, free of any I/O.
//!
//! The NNTP side: status lines, the command response sum type, raw article
//! parsing, wildmat matching, and the article-range grammar. The BP7 side:
//! the CBOR payload codec (with optional zlib body compression), the
//! outbound stream frame and inbound acknowledgement codecs, and a minimal
//! bundle decoder.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod article;
mod bundle;
mod frames;
mod payload;
mod range;
mod response;
pub mod status;
mod wildmat;

pub use article::{parse_article, RawArticle};
pub use bundle::Bundle;
pub use frames::{decode_ack, encode_outbound, AckFrame, OutboundFrame, StreamFrame};
pub use payload::{decode_payload, encode_payload};
pub use range::ArticleRange;
pub use response::Response;
pub use wildmat::wildmat_match;

use thiserror::Error;

/// Errors from the BP7 codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("CBOR decode error: {0}")]
    Cbor(String),

    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    #[error("malformed {0}")]
    Malformed(&'static str),

    #[error("zlib error: {0}")]
    Zlib(#[from] std::io::Error),

    #[error("body is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
