// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    let before = clock.epoch_ms();
    clock.advance(Duration::from_secs(2));
    assert_eq!(clock.epoch_ms(), before + 2000);
}

#[test]
fn fake_clock_set_epoch() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
    assert_eq!(clock.now_utc().timestamp_millis(), 42);
}

#[test]
fn system_clock_is_sane() {
    // Anything after 2020 counts as sane here.
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
