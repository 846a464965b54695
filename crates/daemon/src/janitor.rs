// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Periodic article expiry.
//!
//! Every `janitor.sleep` the janitor deletes articles older than the
//! configured retention window. Spool entries are never touched; expiring
//! those is an operator decision.

use bn_core::Clock;
use bn_storage::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One expiry sweep; returns the number of deleted articles. A zero
/// `expiry` disables expiry entirely.
pub fn sweep<C: Clock>(store: &Store, clock: &C, expiry: Duration) -> Result<usize, StoreError> {
    if expiry.is_zero() {
        return Ok(0);
    }
    let cutoff = clock.now_utc() - chrono::Duration::milliseconds(expiry.as_millis() as i64);
    store.expire_articles_before(cutoff)
}

/// Long-running janitor task.
pub async fn run<C: Clock>(
    store: Arc<Store>,
    clock: C,
    expiry: Duration,
    sleep: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(sleep) => {}
            _ = cancel.cancelled() => return,
        }

        debug!("janitor task reporting for duty");
        match sweep(&store, &clock, expiry) {
            Ok(deleted) => debug!(deleted, "expired articles deleted"),
            Err(e) => warn!(error = %e, "janitor sweep failed"),
        }
        debug!(sleep_secs = sleep.as_secs(), "janitor task going back to sleep");
    }
}

#[cfg(test)]
#[path = "janitor_tests.rs"]
mod tests;
