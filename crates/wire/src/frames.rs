// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! WebSocket frame codecs for the DTND stream channel.
//!
//! Outbound: one CBOR map per bundle send request. Inbound binary frames
//! are bundle acknowledgements, CBOR maps keyed `src`/`dst`/`bid`/`data`;
//! inbound text frames carry three-digit status lines.

use crate::payload::{from_bytes, map_get, map_text, to_bytes};
use crate::CodecError;
use ciborium::Value;

/// A bundle send request as written to the stream channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub src: String,
    pub dst: String,
    pub delivery_notification: bool,
    pub lifetime_ms: u64,
    /// CBOR-encoded article payload.
    pub data: Vec<u8>,
}

/// A bundle acknowledgement (or remote article) from the backchannel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckFrame {
    pub src: String,
    pub dst: String,
    pub bid: String,
    /// CBOR-encoded article payload.
    pub data: Vec<u8>,
}

/// A frame as delivered by the stream adapter, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Text status line, e.g. `200 tx dtn://...`.
    Status(String),
    /// Binary acknowledgement frame.
    Ack(AckFrame),
}

/// Encode a send request for the stream channel.
pub fn encode_outbound(frame: &OutboundFrame) -> Result<Vec<u8>, CodecError> {
    let value = Value::Map(vec![
        (Value::Text("src".into()), Value::Text(frame.src.clone())),
        (Value::Text("dst".into()), Value::Text(frame.dst.clone())),
        (
            Value::Text("delivery_notification".into()),
            Value::Bool(frame.delivery_notification),
        ),
        (Value::Text("lifetime".into()), Value::Integer(frame.lifetime_ms.into())),
        (Value::Text("data".into()), Value::Bytes(frame.data.clone())),
    ]);
    to_bytes(&value)
}

/// Decode an inbound binary frame.
pub fn decode_ack(bytes: &[u8]) -> Result<AckFrame, CodecError> {
    let value = from_bytes(bytes)?;
    let map = value.as_map().ok_or(CodecError::Malformed("ack: expected map"))?;
    let src = map_text(map, "src").ok_or(CodecError::Malformed("ack: missing src"))?;
    let dst = map_text(map, "dst").ok_or(CodecError::Malformed("ack: missing dst"))?;
    let bid = map_text(map, "bid").ok_or(CodecError::Malformed("ack: missing bid"))?;
    let data = map_get(map, "data")
        .and_then(Value::as_bytes)
        .ok_or(CodecError::Malformed("ack: missing data"))?
        .clone();
    Ok(AckFrame { src, dst, bid, data })
}

#[cfg(test)]
#[path = "frames_tests.rs"]
mod tests;
