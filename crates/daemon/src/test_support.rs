// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Shared fixtures for daemon tests.

use crate::config::Config;
use crate::dtnd::{ControlApi, DtndError, DtndHandles, StreamHandle};
use crate::lifecycle::reconcile_groups;
use crate::listener::ListenCtx;
use crate::spool::Spool;
use async_trait::async_trait;
use bn_storage::Store;
use bn_wire::{Bundle, OutboundFrame};
use ciborium::Value;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub(crate) fn test_config(groups: &[&str]) -> Config {
    let list: Vec<String> = groups.iter().map(|g| format!("\"{g}\"")).collect();
    let toml = format!(
        r#"
        [usenet]
        email = "alice@example.org"
        newsgroups = [{}]

        [nntp]
        hostname = "news.test"

        [dtnd]
        node_id = "dtn://n1/"

        [backoff]
        constant_wait = "10ms"
        "#,
        list.join(", ")
    );
    Config::from_toml(&toml).unwrap()
}

/// A store + spool + handles wired like the running daemon, minus the
/// network tasks.
pub(crate) struct TestBackend {
    // Held for its Drop: removes the store directory.
    #[allow(dead_code)]
    dir: TempDir,
    pub store: Arc<Store>,
    pub handles: Arc<DtndHandles>,
    pub config: Arc<Config>,
    pub spool: Arc<Spool>,
}

pub(crate) fn backend(groups: &[&str]) -> TestBackend {
    backend_with_config(test_config(groups))
}

pub(crate) fn backend_with_config(config: Config) -> TestBackend {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db")).unwrap());
    reconcile_groups(&store, &config.usenet.newsgroups).unwrap();
    let config = Arc::new(config);
    let handles = Arc::new(DtndHandles::new());
    let spool = Arc::new(Spool::new(Arc::clone(&store), Arc::clone(&handles), Arc::clone(&config)));
    TestBackend { dir, store, handles, config, spool }
}

impl TestBackend {
    pub fn listen_ctx(&self) -> ListenCtx {
        ListenCtx {
            store: Arc::clone(&self.store),
            spool: Arc::clone(&self.spool),
            config: Arc::clone(&self.config),
        }
    }

    /// Pretend the stream channel is up; returns the receiver that sees
    /// every outbound frame.
    pub fn connect_stream(&self) -> mpsc::Receiver<OutboundFrame> {
        let (tx, rx) = mpsc::channel(16);
        self.handles.set_stream(StreamHandle::new(tx));
        rx
    }
}

/// In-memory stand-in for the DTND control channel.
#[derive(Default)]
pub(crate) struct FakeControl {
    pub bundles: Vec<FakeBundle>,
    pub registered: Mutex<Vec<String>>,
}

pub(crate) struct FakeBundle {
    pub bundle_id: String,
    /// Address the daemon-side substring filter matches against.
    pub address: String,
    pub bytes: Vec<u8>,
    pub fail_download: bool,
}

#[async_trait]
impl ControlApi for FakeControl {
    fn node_id(&self) -> &str {
        "dtn://n1/"
    }

    async fn register(&self, endpoint: &str) -> Result<(), DtndError> {
        self.registered.lock().push(endpoint.to_string());
        Ok(())
    }

    async fn list_bundles(&self, address_part: &str) -> Result<Vec<String>, DtndError> {
        Ok(self
            .bundles
            .iter()
            .filter(|b| b.address.contains(address_part))
            .map(|b| b.bundle_id.clone())
            .collect())
    }

    async fn download(&self, bundle_id: &str) -> Result<Bundle, DtndError> {
        let bundle = self
            .bundles
            .iter()
            .find(|b| b.bundle_id == bundle_id)
            .ok_or_else(|| DtndError::Permanent(format!("no bundle {bundle_id}")))?;
        if bundle.fail_download {
            return Err(DtndError::Transient("download refused".to_string()));
        }
        Bundle::from_cbor(&bundle.bytes).map_err(|e| DtndError::Permanent(e.to_string()))
    }
}

/// Encode a wire bundle the way DTND would serve it.
pub(crate) fn encode_bundle(
    source: &str,
    destination: &str,
    timestamp: u64,
    sequence: u64,
    payload: &[u8],
) -> Vec<u8> {
    let eid = |uri: &str| {
        let ssp = uri.strip_prefix("dtn:").unwrap_or(uri);
        Value::Array(vec![Value::Integer(1.into()), Value::Text(ssp.to_string())])
    };
    let primary = Value::Array(vec![
        Value::Integer(7.into()),
        Value::Integer(0.into()),
        Value::Integer(0.into()),
        eid(destination),
        eid(source),
        eid(source),
        Value::Array(vec![
            Value::Integer(timestamp.into()),
            Value::Integer(sequence.into()),
        ]),
        Value::Integer(86_400_000.into()),
    ]);
    let payload_block = Value::Array(vec![
        Value::Integer(1.into()),
        Value::Integer(1.into()),
        Value::Integer(0.into()),
        Value::Integer(0.into()),
        Value::Bytes(payload.to_vec()),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&Value::Array(vec![primary, payload_block]), &mut buf).unwrap();
    buf
}
