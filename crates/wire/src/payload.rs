// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Article payload codec.
//!
//! The payload block of every news bundle is a CBOR map with keys
//! `subject`, `body`, `references`, and optionally `compressed: true`, in
//! which case `body` is a zlib-compressed byte string. Decoding always
//! returns the decompressed text form; hashes are computed over that form
//! on both the post and acknowledgement paths.

use crate::CodecError;
use bn_core::SpoolPayload;
use ciborium::Value;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Encode a payload for the wire, optionally compressing the body.
pub fn encode_payload(payload: &SpoolPayload, compress: bool) -> Result<Vec<u8>, CodecError> {
    let mut entries = vec![
        (Value::Text("subject".into()), Value::Text(payload.subject.clone())),
        (Value::Text("references".into()), Value::Text(payload.references.clone())),
    ];
    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload.body.as_bytes())?;
        entries.push((Value::Text("compressed".into()), Value::Bool(true)));
        entries.push((Value::Text("body".into()), Value::Bytes(encoder.finish()?)));
    } else {
        entries.push((Value::Text("body".into()), Value::Text(payload.body.clone())));
    }
    to_bytes(&Value::Map(entries))
}

/// Decode a wire payload, inflating the body when flagged compressed.
pub fn decode_payload(bytes: &[u8]) -> Result<SpoolPayload, CodecError> {
    let value = from_bytes(bytes)?;
    let map = value.as_map().ok_or(CodecError::Malformed("payload: expected map"))?;

    let subject = map_text(map, "subject").unwrap_or_default();
    let references = map_text(map, "references").unwrap_or_default();
    let compressed = map_get(map, "compressed").and_then(Value::as_bool).unwrap_or(false);

    let body_value = map_get(map, "body").ok_or(CodecError::Malformed("payload: missing body"))?;
    let body = if compressed {
        let deflated = body_value
            .as_bytes()
            .ok_or(CodecError::Malformed("payload: compressed body must be bytes"))?;
        let mut inflated = Vec::new();
        ZlibDecoder::new(deflated.as_slice()).read_to_end(&mut inflated)?;
        String::from_utf8(inflated)?
    } else {
        body_value
            .as_text()
            .ok_or(CodecError::Malformed("payload: body must be text"))?
            .to_string()
    };

    Ok(SpoolPayload { subject, body, references })
}

pub(crate) fn to_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::CborEncode(e.to_string()))?;
    Ok(buf)
}

pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Value, CodecError> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::Cbor(e.to_string()))
}

pub(crate) fn map_get<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.as_text() == Some(key))
        .map(|(_, v)| v)
}

pub(crate) fn map_text(map: &[(Value, Value)], key: &str) -> Option<String> {
    map_get(map, key).and_then(Value::as_text).map(str::to_string)
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
