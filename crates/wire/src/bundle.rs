// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Minimal BP7 bundle decoder (RFC 9171).
//!
//! The control channel's download endpoint returns whole bundles; the
//! gateway only needs the primary block identity and the payload block
//! bytes, so this decoder extracts exactly that and skips everything else
//! (CRCs, extension blocks, fragment fields).

use crate::payload::from_bytes;
use crate::CodecError;
use ciborium::Value;

/// The decoded view of a bundle: where it came from, where it goes, its
/// creation timestamp, and the payload block data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub source: String,
    pub destination: String,
    /// DTN creation time, milliseconds since 2000-01-01T00:00:00Z.
    pub timestamp: u64,
    pub sequence_number: u64,
    /// Raw payload block data (CBOR-encoded article payload).
    pub payload: Vec<u8>,
}

impl Bundle {
    /// Decode a bundle from its CBOR wire form.
    ///
    /// A bundle is an array of blocks. The first is the primary block
    /// `[version, flags, crc_type, destination, source, report_to,
    /// [timestamp, sequence], lifetime, ...]`; the rest are canonical
    /// blocks `[type, number, flags, crc_type, data, ...]` of which block
    /// type 1 carries the payload.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CodecError> {
        let value = from_bytes(bytes)?;
        let blocks = value
            .as_array()
            .ok_or(CodecError::Malformed("bundle: expected block array"))?;
        let primary = blocks
            .first()
            .and_then(Value::as_array)
            .ok_or(CodecError::Malformed("bundle: missing primary block"))?;

        let destination = decode_eid(primary.get(3))?;
        let source = decode_eid(primary.get(4))?;

        let creation = primary
            .get(6)
            .and_then(Value::as_array)
            .ok_or(CodecError::Malformed("bundle: missing creation timestamp"))?;
        let timestamp = as_u64(creation.first())
            .ok_or(CodecError::Malformed("bundle: bad creation time"))?;
        let sequence_number = as_u64(creation.get(1))
            .ok_or(CodecError::Malformed("bundle: bad sequence number"))?;

        let payload = blocks[1..]
            .iter()
            .filter_map(Value::as_array)
            .find(|block| as_u64(block.first()) == Some(1))
            .and_then(|block| block.get(4).and_then(Value::as_bytes).cloned())
            .ok_or(CodecError::Malformed("bundle: missing payload block"))?;

        Ok(Bundle { source, destination, timestamp, sequence_number, payload })
    }
}

/// Decode an endpoint id `[scheme, ssp]`. Scheme 1 is `dtn` with a text
/// SSP (`//node/demux`, or integer 0 for the null endpoint); scheme 2 is
/// `ipn` with `[node, service]`.
fn decode_eid(value: Option<&Value>) -> Result<String, CodecError> {
    let pair = value
        .and_then(Value::as_array)
        .ok_or(CodecError::Malformed("bundle: bad endpoint"))?;
    match (as_u64(pair.first()), pair.get(1)) {
        (Some(1), Some(Value::Text(ssp))) => Ok(format!("dtn:{ssp}")),
        (Some(1), Some(Value::Integer(_))) => Ok("dtn:none".to_string()),
        (Some(2), Some(Value::Array(parts))) => {
            let node = as_u64(parts.first()).ok_or(CodecError::Malformed("bundle: bad ipn node"))?;
            let service =
                as_u64(parts.get(1)).ok_or(CodecError::Malformed("bundle: bad ipn service"))?;
            Ok(format!("ipn:{node}.{service}"))
        }
        _ => Err(CodecError::Malformed("bundle: unknown endpoint scheme")),
    }
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_integer).and_then(|i| u64::try_from(i).ok())
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
