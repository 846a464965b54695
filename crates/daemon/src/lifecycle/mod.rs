// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Daemon lifecycle: startup, shutdown, group reconciliation.

mod reconcile;
mod startup;

pub use reconcile::reconcile_groups;
pub use startup::startup;

use crate::dtnd::DtndHandles;
use crate::spool::Spool;
use bn_storage::{Store, StoreError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Bounded wait for in-flight work on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle errors (fatal at startup).
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind NNTP listener: {0}")]
    Bind(#[source] std::io::Error),
}

/// A running daemon: the shared state plus its supervised tasks.
pub struct Daemon {
    pub store: Arc<Store>,
    pub handles: Arc<DtndHandles>,
    pub spool: Arc<Spool>,
    pub nntp_addr: SocketAddr,
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Daemon {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Graceful shutdown: signal every task, give in-flight work a bounded
    /// wait, then checkpoint the store.
    pub async fn shutdown(self) {
        info!("shutting down daemon");
        self.cancel.cancel();

        for (name, handle) in self.tasks {
            match tokio::time::timeout(DRAIN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(task = name, error = %e, "task ended abnormally"),
                Err(_) => warn!(task = name, "task did not stop within the drain timeout"),
            }
        }

        if let Err(e) = self.store.checkpoint() {
            warn!(error = %e, "failed to write shutdown checkpoint");
        }
        info!("daemon shutdown complete");
    }
}
