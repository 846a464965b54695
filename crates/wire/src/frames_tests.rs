// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;

#[test]
fn outbound_frame_shape() {
    let frame = OutboundFrame {
        src: "dtn://n1/mail/example.org/alice".into(),
        dst: "dtn://g.test/~news".into(),
        delivery_notification: true,
        lifetime_ms: 86_400_000,
        data: vec![1, 2, 3],
    };
    let bytes = encode_outbound(&frame).unwrap();

    let value = crate::payload::from_bytes(&bytes).unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(
        crate::payload::map_text(map, "src").unwrap(),
        "dtn://n1/mail/example.org/alice"
    );
    assert_eq!(crate::payload::map_text(map, "dst").unwrap(), "dtn://g.test/~news");
    assert_eq!(
        crate::payload::map_get(map, "delivery_notification").unwrap().as_bool(),
        Some(true)
    );
    let lifetime = crate::payload::map_get(map, "lifetime").unwrap().as_integer().unwrap();
    assert_eq!(u64::try_from(lifetime).unwrap(), 86_400_000);
    assert_eq!(
        crate::payload::map_get(map, "data").unwrap().as_bytes().unwrap(),
        &vec![1u8, 2, 3]
    );
}

#[test]
fn ack_roundtrip() {
    let value = ciborium::Value::Map(vec![
        (ciborium::Value::Text("src".into()), ciborium::Value::Text("dtn://n2/mail/other.org/bob".into())),
        (ciborium::Value::Text("dst".into()), ciborium::Value::Text("dtn://g.test/~news".into())),
        (ciborium::Value::Text("bid".into()), ciborium::Value::Text("dtn://n2/mail/other.org/bob-1700000100-2".into())),
        (ciborium::Value::Text("data".into()), ciborium::Value::Bytes(vec![9, 9])),
    ]);
    let bytes = crate::payload::to_bytes(&value).unwrap();
    let ack = decode_ack(&bytes).unwrap();
    assert_eq!(ack.src, "dtn://n2/mail/other.org/bob");
    assert_eq!(ack.dst, "dtn://g.test/~news");
    assert_eq!(ack.bid, "dtn://n2/mail/other.org/bob-1700000100-2");
    assert_eq!(ack.data, vec![9, 9]);
}

#[test]
fn ack_missing_bid_is_malformed() {
    let value = ciborium::Value::Map(vec![
        (ciborium::Value::Text("src".into()), ciborium::Value::Text("s".into())),
        (ciborium::Value::Text("dst".into()), ciborium::Value::Text("d".into())),
        (ciborium::Value::Text("data".into()), ciborium::Value::Bytes(vec![])),
    ]);
    let bytes = crate::payload::to_bytes(&value).unwrap();
    assert!(matches!(decode_ack(&bytes), Err(CodecError::Malformed("ack: missing bid"))));
}

#[test]
fn ack_garbage_is_cbor_error() {
    assert!(matches!(decode_ack(b"\x9f\x9f"), Err(CodecError::Cbor(_))));
}
