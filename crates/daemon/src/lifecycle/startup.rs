// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Daemon startup sequence.

use super::{reconcile_groups, Daemon, LifecycleError};
use crate::backchannel::Reconciler;
use crate::config::Config;
use crate::dtnd::{control, ControlApi, DtndHandles, StreamSupervisor};
use crate::ingest;
use crate::janitor;
use crate::listener::{ListenCtx, Listener};
use crate::spool::Spool;
use bn_core::SystemClock;
use bn_storage::Store;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Capacity of the inbound frame FIFO between the stream supervisor and
/// the reconciler worker. Bounded so wire order is preserved under load.
const FRAME_QUEUE: usize = 256;

/// Bring the backend up. The connection to the store is the only one that
/// must succeed; the DTN daemon may be away and is chased by the stream
/// supervisor's reconnect loop.
pub async fn startup(config: Config) -> Result<Daemon, LifecycleError> {
    let config = Arc::new(config);
    let cancel = CancellationToken::new();
    let mut tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)> = Vec::new();

    // 1. Open the store; the on-disk layout is created idempotently.
    let store = Arc::new(Store::open(&config.backend.db_path())?);

    // 2. Make the group set equal the configured list.
    reconcile_groups(&store, &config.usenet.newsgroups)?;
    info!(groups = config.usenet.newsgroups.len(), "active newsgroups on this server");

    let handles = Arc::new(DtndHandles::new());
    let spool = Arc::new(Spool::new(Arc::clone(&store), Arc::clone(&handles), Arc::clone(&config)));

    // 3. Acquire the control channel and register every endpoint.
    // 4. One synchronous ingestion pass over the daemon's bundle store.
    if let Some(client) =
        control::connect_with_backoff(&config.dtnd, &config.backoff, &cancel).await
    {
        control::register_endpoints(&client, &config).await;
        let client: Arc<dyn ControlApi> = Arc::new(client);
        handles.set_control(Arc::clone(&client));

        match ingest::ingest_all(&store, client.as_ref(), &config.usenet.newsgroups).await {
            Ok(count) => info!(count, "startup ingestion finished"),
            Err(e) => error!(error = %e, "startup ingestion failed"),
        }
    }

    // 5. Stream supervisor plus the single reconciler worker it feeds.
    let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE);
    let reconciler = Reconciler::new(Arc::clone(&store), config.nntp.hostname.clone());
    tasks.push(("reconciler", tokio::spawn(reconciler.run(frame_rx, cancel.clone()))));

    let supervisor = StreamSupervisor {
        config: Arc::clone(&config),
        store: Arc::clone(&store),
        handles: Arc::clone(&handles),
        spool: Arc::clone(&spool),
        frame_tx,
        cancel: cancel.clone(),
    };
    tasks.push(("stream", tokio::spawn(supervisor.run())));

    // 6. Janitor.
    tasks.push((
        "janitor",
        tokio::spawn(janitor::run(
            Arc::clone(&store),
            SystemClock,
            config.usenet.expiry_time(),
            config.janitor.sleep(),
            cancel.clone(),
        )),
    ));

    // 7. Drain the spool once the stream is up.
    {
        let spool = Arc::clone(&spool);
        let cancel = cancel.clone();
        tasks.push(("spool-drain", tokio::spawn(async move { spool.drain(cancel).await })));
    }

    // 8. NNTP listener, last: readers only get in once the backend runs.
    let ctx = Arc::new(ListenCtx {
        store: Arc::clone(&store),
        spool: Arc::clone(&spool),
        config: Arc::clone(&config),
    });
    let listener = Listener::bind(ctx, cancel.clone()).await.map_err(LifecycleError::Bind)?;
    let nntp_addr = listener.local_addr().map_err(LifecycleError::Bind)?;
    tasks.push(("listener", tokio::spawn(listener.run())));

    info!("daemon started");
    Ok(Daemon { store, handles, spool, nntp_addr, cancel, tasks })
}
