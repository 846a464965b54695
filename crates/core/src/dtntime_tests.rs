// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use chrono::TimeZone;

#[test]
fn epoch_zero_is_y2k() {
    let dt = from_dtn_timestamp(0);
    assert_eq!(dt, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn known_timestamp() {
    // 1700000000 ms past the DTN epoch: 2000-01-20T16:13:20Z
    let dt = from_dtn_timestamp(1_700_000_000);
    assert_eq!(dt, Utc.with_ymd_and_hms(2000, 1, 20, 16, 13, 20).unwrap());
}

#[test]
fn roundtrips() {
    for ms in [0u64, 1, 1_700_000_000, 86_400_000] {
        assert_eq!(to_dtn_timestamp(from_dtn_timestamp(ms)), ms);
    }
}

#[test]
fn pre_epoch_clamps_to_zero() {
    let dt = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(to_dtn_timestamp(dt), 0);
}
