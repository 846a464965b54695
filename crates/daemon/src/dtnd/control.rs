// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! REST control client for the DTN daemon.
//!
//! Covers the four requests the gateway needs: node id, endpoint
//! registration, address-filtered bundle listing, and bundle download.

use super::{Backoff, DtndError};
use crate::config::{BackoffConfig, Config, DtndConfig};
use async_trait::async_trait;
use bn_core::{group_endpoint, sender_uri_for_email};
use bn_wire::Bundle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// The control-channel operations, as a trait so engines can be exercised
/// against a fake in tests.
#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Node id as reported by the daemon, `dtn://<id>/` with the trailing
    /// slash preserved.
    fn node_id(&self) -> &str;

    async fn register(&self, endpoint: &str) -> Result<(), DtndError>;

    /// Bundle ids whose addresses contain the given substring.
    async fn list_bundles(&self, address_part: &str) -> Result<Vec<String>, DtndError>;

    async fn download(&self, bundle_id: &str) -> Result<Bundle, DtndError>;
}

/// HTTP client against the daemon's REST interface.
pub struct ControlClient {
    http: reqwest::Client,
    base: String,
    node_id: String,
}

impl ControlClient {
    /// Connect and read the node id. Failure here is always transient;
    /// the daemon is simply not (yet) reachable.
    pub async fn connect(config: &DtndConfig) -> Result<Self, DtndError> {
        let http = reqwest::Client::new();
        let base = config.rest_base();
        let response = http
            .get(format!("{base}/status/nodeid"))
            .send()
            .await
            .map_err(transient)?;
        let text = check(response).await?.text().await.map_err(transient)?;
        let mut node_id = text.trim().trim_matches('"').to_string();
        if !node_id.ends_with('/') {
            node_id.push('/');
        }
        debug!(node_id, "connected to DTNd REST interface");
        Ok(Self { http, base, node_id })
    }
}

#[async_trait]
impl ControlApi for ControlClient {
    fn node_id(&self) -> &str {
        &self.node_id
    }

    async fn register(&self, endpoint: &str) -> Result<(), DtndError> {
        let response = self
            .http
            .get(format!("{}/register?{}", self.base, endpoint))
            .send()
            .await
            .map_err(transient)?;
        check(response).await?;
        Ok(())
    }

    async fn list_bundles(&self, address_part: &str) -> Result<Vec<String>, DtndError> {
        let response = self
            .http
            .get(format!("{}/status/bundles/filtered?addr={}", self.base, address_part))
            .send()
            .await
            .map_err(transient)?;
        check(response)
            .await?
            .json::<Vec<String>>()
            .await
            .map_err(|e| DtndError::Permanent(format!("bundle list decode: {e}")))
    }

    async fn download(&self, bundle_id: &str) -> Result<Bundle, DtndError> {
        let response = self
            .http
            .get(format!("{}/download?{}", self.base, bundle_id))
            .send()
            .await
            .map_err(transient)?;
        let bytes = check(response).await?.bytes().await.map_err(transient)?;
        Bundle::from_cbor(&bytes).map_err(|e| DtndError::Permanent(e.to_string()))
    }
}

/// Retry-loop wrapper around [`ControlClient::connect`] with the standard
/// backoff. Returns `None` only on cancellation.
pub async fn connect_with_backoff(
    dtnd: &DtndConfig,
    backoff_config: &BackoffConfig,
    cancel: &CancellationToken,
) -> Option<ControlClient> {
    let mut backoff = Backoff::new(backoff_config);
    loop {
        let delay = backoff.next_delay();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return None,
        }

        debug!("contacting DTNd REST interface");
        match ControlClient::connect(dtnd).await {
            Ok(client) => return Some(client),
            Err(e) => {
                debug!(error = %e, "DTNd REST interface not available");
                if let Some(pause) = backoff.record_failure() {
                    error!(
                        pause_secs = pause.as_secs(),
                        "DTNd REST interface not available, pausing reconnection attempts"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(pause) => {}
                        _ = cancel.cancelled() => return None,
                    }
                }
            }
        }
    }
}

/// Register every group endpoint plus the sender backchannel endpoint.
pub async fn register_endpoints(control: &dyn ControlApi, config: &Config) {
    for group in &config.usenet.newsgroups {
        let endpoint = group_endpoint(group);
        debug!(endpoint, "registering group endpoint");
        if let Err(e) = control.register(&endpoint).await {
            warn!(endpoint, error = %e, "could not register group endpoint");
        }
    }

    // The sender address is registered too so acknowledgements for our own
    // articles come back over the stream channel.
    match sender_uri_for_email(control.node_id(), &config.usenet.email) {
        Ok(endpoint) => {
            debug!(endpoint, "registering sender backchannel endpoint");
            if let Err(e) = control.register(&endpoint).await {
                warn!(endpoint, error = %e, "could not register sender endpoint");
            }
        }
        Err(e) => warn!(error = %e, "configured sender address is unusable"),
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, DtndError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        Err(DtndError::Permanent(format!("HTTP {status}: {}", body.trim())))
    } else {
        Err(DtndError::Transient(format!("HTTP {status}")))
    }
}

fn transient(e: reqwest::Error) -> DtndError {
    DtndError::Transient(e.to_string())
}
