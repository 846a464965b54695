// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Long-running supervisor for the WebSocket stream channel.
//!
//! Connects, selects binary framing with `/data`, subscribes every group
//! endpoint, then pumps outbound frames from the handle channel onto the
//! socket and forwards inbound frames to the reconciler's bounded FIFO.
//! On loss of the stream both client handles are discarded and the control
//! channel is re-established before the stream reconnects. Every
//! successful (re)connect re-runs ingestion and a spool drain.

use super::{control, Backoff, DtndHandles, StreamHandle};
use crate::config::Config;
use crate::ingest;
use crate::spool::Spool;
use bn_core::group_endpoint;
use bn_storage::Store;
use bn_wire::{decode_ack, encode_outbound, StreamFrame};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the outbound frame queue per connection.
const OUTBOUND_QUEUE: usize = 64;

pub struct StreamSupervisor {
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub handles: Arc<DtndHandles>,
    pub spool: Arc<Spool>,
    /// Inbound frames, consumed in wire order by the reconciler worker.
    pub frame_tx: mpsc::Sender<StreamFrame>,
    pub cancel: CancellationToken,
}

impl StreamSupervisor {
    /// Outer reconnect loop; returns only on shutdown.
    pub async fn run(self) {
        let mut backoff = Backoff::new(&self.config.backoff);

        while !self.cancel.is_cancelled() {
            // The control channel comes up first: endpoint registrations
            // must exist before the stream subscriptions mean anything.
            if self.handles.control().is_none() {
                let Some(client) =
                    control::connect_with_backoff(&self.config.dtnd, &self.config.backoff, &self.cancel)
                        .await
                else {
                    return;
                };
                control::register_endpoints(&client, &self.config).await;
                self.handles.set_control(Arc::new(client));
            }

            let delay = backoff.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.cancel.cancelled() => return,
            }

            debug!(url = %self.config.dtnd.ws_url(), "connecting stream channel");
            let ws = match tokio_tungstenite::connect_async(self.config.dtnd.ws_url()).await {
                Ok((ws, _)) => ws,
                Err(e) => {
                    warn!(error = %e, "stream connection to DTNd not possible, will retry");
                    if let Some(pause) = backoff.record_failure() {
                        tokio::select! {
                            _ = tokio::time::sleep(pause) => {}
                            _ = self.cancel.cancelled() => return,
                        }
                    }
                    continue;
                }
            };

            backoff.reset();
            if self.serve_connection(ws).await.is_break() {
                return;
            }

            // Connection lost: drop both handles and start over with the
            // control channel.
            self.handles.clear_stream();
            self.handles.clear_control();
            warn!("stream connection to DTNd lost, reconnecting");
        }
    }

    /// Drive one established connection until it drops or shutdown.
    async fn serve_connection(
        &self,
        ws: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> std::ops::ControlFlow<()> {
        use std::ops::ControlFlow;

        let (mut sink, mut stream) = ws.split();

        // Select binary framing, then subscribe to every group endpoint.
        if let Err(e) = sink.send(Message::text("/data")).await {
            warn!(error = %e, "could not select binary framing");
            return ControlFlow::Continue(());
        }
        for group in &self.config.usenet.newsgroups {
            let endpoint = group_endpoint(group);
            if let Err(e) = sink.send(Message::text(format!("/subscribe {endpoint}"))).await {
                warn!(endpoint, error = %e, "could not subscribe group endpoint");
                return ControlFlow::Continue(());
            }
        }
        info!(groups = self.config.usenet.newsgroups.len(), "stream channel established");

        let (tx, mut outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        self.handles.set_stream(StreamHandle::new(tx));

        // Historic bundles and the spool are both replayed on every
        // (re)connect; the reconciler's dedup makes this idempotent.
        self.spawn_resync();

        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { return ControlFlow::Continue(()) };
                    let bytes = match encode_outbound(&frame) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            warn!(error = %e, "dropping unencodable outbound frame");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::binary(bytes)).await {
                        warn!(error = %e, "outbound send failed");
                        return ControlFlow::Continue(());
                    }
                }
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if self.frame_tx.send(StreamFrame::Status(text.to_string())).await.is_err() {
                                return ControlFlow::Break(());
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            match decode_ack(&bytes) {
                                Ok(ack) => {
                                    if self.frame_tx.send(StreamFrame::Ack(ack)).await.is_err() {
                                        return ControlFlow::Break(());
                                    }
                                }
                                // Permanent: skip the frame, keep the channel.
                                Err(e) => warn!(error = %e, "undecodable binary frame from DTNd"),
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "stream closed by DTNd");
                            return ControlFlow::Continue(());
                        }
                        Some(Ok(_)) => {} // Ping/Pong, handled by tungstenite
                        Some(Err(e)) => {
                            warn!(error = %e, "stream read error");
                            return ControlFlow::Continue(());
                        }
                        None => return ControlFlow::Continue(()),
                    }
                }
                _ = self.cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return ControlFlow::Break(());
                }
            }
        }
    }

    /// Re-run ingestion and spool delivery after a (re)connect.
    fn spawn_resync(&self) {
        if let Some(control) = self.handles.control() {
            let store = Arc::clone(&self.store);
            let groups = self.config.usenet.newsgroups.clone();
            tokio::spawn(async move {
                match ingest::ingest_all(&store, control.as_ref(), &groups).await {
                    Ok(count) => debug!(count, "post-connect ingestion finished"),
                    Err(e) => warn!(error = %e, "post-connect ingestion failed"),
                }
            });
        }

        let spool = Arc::clone(&self.spool);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            spool.drain(cancel).await;
        });
    }
}
