// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! TOML configuration.
//!
//! Missing tables and keys take defaults; a duration string that fails to
//! parse falls back to its default with a logged warning. A missing or
//! syntactically broken file, or a missing `usenet.email`, is fatal before
//! any socket is opened.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Configuration errors (all fatal at startup).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("usenet.email must be set to the sender address")]
    MissingEmail,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub nntp: NntpConfig,
    pub dtnd: DtndConfig,
    pub backoff: BackoffConfig,
    pub bundles: BundleConfig,
    pub usenet: UsenetConfig,
    pub janitor: JanitorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Store location. A `file://` prefix is accepted and stripped.
    pub db_url: String,
}

impl BackendConfig {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(self.db_url.strip_prefix("file://").unwrap_or(&self.db_url))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NntpConfig {
    pub host: String,
    pub port: u16,
    /// Advertised in the greeting and in Path / Xref headers.
    pub hostname: String,
    /// `read-write` or `read-only`.
    pub server_type: String,
    pub max_empty_requests: u32,
    read_timeout: String,
}

impl NntpConfig {
    pub fn posting_allowed(&self) -> bool {
        self.server_type != "read-only"
    }

    pub fn read_timeout(&self) -> Duration {
        duration_or_default(&self.read_timeout, "nntp.read_timeout", "12h")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DtndConfig {
    pub host: String,
    pub port: u16,
    /// Fallback node id when the daemon cannot be asked, `dtn://<id>/`.
    pub node_id: String,
    pub ws_path: String,
    pub rest_path: String,
}

impl DtndConfig {
    pub fn rest_base(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.rest_path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.ws_path)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    initial_wait: String,
    pub max_retries: u32,
    reconnection_pause: String,
    constant_wait: String,
}

impl BackoffConfig {
    pub fn initial_wait(&self) -> Duration {
        duration_or_default(&self.initial_wait, "backoff.initial_wait", "500ms")
    }

    pub fn reconnection_pause(&self) -> Duration {
        duration_or_default(&self.reconnection_pause, "backoff.reconnection_pause", "300s")
    }

    /// Poll interval while waiting for a client handle to appear.
    pub fn constant_wait(&self) -> Duration {
        duration_or_default(&self.constant_wait, "backoff.constant_wait", "500ms")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    lifetime: String,
    pub delivery_notification: bool,
    pub compress_body: bool,
}

impl BundleConfig {
    /// Bundle lifetime in milliseconds, as DTND expects it.
    pub fn lifetime_ms(&self) -> u64 {
        duration_or_default(&self.lifetime, "bundles.lifetime", "24h").as_millis() as u64
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsenetConfig {
    /// Sender identity for every posted article.
    pub email: String,
    pub newsgroups: Vec<String>,
    expiry_time: String,
}

impl UsenetConfig {
    /// Article retention window; zero disables expiry.
    pub fn expiry_time(&self) -> Duration {
        duration_or_default(&self.expiry_time, "usenet.expiry_time", "0s")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    sleep: String,
}

impl JanitorConfig {
    pub fn sleep(&self) -> Duration {
        duration_or_default(&self.sleep, "janitor.sleep", "10m")
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        if config.usenet.email.trim().is_empty() || !config.usenet.email.contains('@') {
            return Err(ConfigError::MissingEmail);
        }
        Ok(config)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { db_url: "bundlenews.db".to_string() }
    }
}

impl Default for NntpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1190,
            hostname: "news.dtn.local".to_string(),
            server_type: "read-write".to_string(),
            max_empty_requests: 10,
            read_timeout: "12h".to_string(),
        }
    }
}

impl Default for DtndConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            node_id: "dtn://node1/".to_string(),
            ws_path: "/ws".to_string(),
            rest_path: String::new(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_wait: "500ms".to_string(),
            max_retries: 20,
            reconnection_pause: "300s".to_string(),
            constant_wait: "500ms".to_string(),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            lifetime: "24h".to_string(),
            delivery_notification: false,
            compress_body: false,
        }
    }
}

impl Default for UsenetConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            newsgroups: Vec::new(),
            expiry_time: "0s".to_string(),
        }
    }
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self { sleep: "10m".to_string() }
    }
}

/// Parse a duration like `500ms`, `30s`, `5m`, `12h`, `7d`. A bare number
/// is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the numeric prefix
    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str.parse().map_err(|_| format!("invalid number in duration: {}", s))?;

    let multiplier = match suffix.trim() {
        "ms" | "millis" | "millisecond" | "milliseconds" => {
            return Ok(Duration::from_millis(num));
        }
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86400,
        other => return Err(format!("unknown duration suffix: {}", other)),
    };

    Ok(Duration::from_secs(num * multiplier))
}

fn duration_or_default(value: &str, key: &str, default: &str) -> Duration {
    match parse_duration(value) {
        Ok(d) => d,
        Err(e) => {
            warn!(key, value, error = %e, "unparseable duration, using default");
            parse_duration(default).unwrap_or(Duration::ZERO)
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
