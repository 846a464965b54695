// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Client adapters for the external DTN daemon.
//!
//! Two channels: a request/response REST control client and a full-duplex
//! WebSocket stream. Both are owned by the supervisor and replaced, never
//! mutated, on reconnect; other components fetch the current handle from
//! [`DtndHandles`] and must tolerate it being absent.

pub mod backoff;
pub mod control;
pub mod stream;

pub use backoff::Backoff;
pub use control::{connect_with_backoff, ControlApi, ControlClient};
pub use stream::StreamSupervisor;

use bn_wire::OutboundFrame;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Transport failure taxonomy. Transient errors drive reconnection;
/// permanent ones mean the offending item is logged and skipped while the
/// channel stays up.
#[derive(Debug, Error)]
pub enum DtndError {
    #[error("transient transport error: {0}")]
    Transient(String),

    #[error("protocol error: {0}")]
    Permanent(String),
}

/// Sender half of the stream channel. Cloneable; frames are queued to the
/// WebSocket writer task.
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::Sender<OutboundFrame>,
}

impl StreamHandle {
    pub fn new(tx: mpsc::Sender<OutboundFrame>) -> Self {
        Self { tx }
    }

    /// Queue a frame for transmission. Fails transiently when the stream
    /// task has gone away (connection loss between lookup and send).
    pub async fn send(&self, frame: OutboundFrame) -> Result<(), DtndError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| DtndError::Transient("stream connection is gone".to_string()))
    }
}

/// The supervisor-owned client handles. `None` while the respective
/// channel is down.
#[derive(Default)]
pub struct DtndHandles {
    control: Mutex<Option<Arc<dyn ControlApi>>>,
    stream: Mutex<Option<StreamHandle>>,
}

impl DtndHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_control(&self, client: Arc<dyn ControlApi>) {
        *self.control.lock() = Some(client);
    }

    pub fn control(&self) -> Option<Arc<dyn ControlApi>> {
        self.control.lock().clone()
    }

    pub fn clear_control(&self) {
        *self.control.lock() = None;
    }

    pub fn set_stream(&self, handle: StreamHandle) {
        *self.stream.lock() = Some(handle);
    }

    pub fn stream(&self) -> Option<StreamHandle> {
        self.stream.lock().clone()
    }

    pub fn clear_stream(&self) {
        *self.stream.lock() = None;
    }

    /// Check-and-wait for a stream handle: polls every `poll` until the
    /// stream is up or the token is cancelled.
    pub async fn wait_stream(
        &self,
        poll: Duration,
        cancel: &CancellationToken,
    ) -> Option<StreamHandle> {
        loop {
            if let Some(handle) = self.stream() {
                return Some(handle);
            }
            tokio::select! {
                _ = tokio::time::sleep(poll) => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }
}
