// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! bundlenewsd: NNTP server over a BP7 bundle overlay.
//!
//! Usage: `bundlenewsd [config.toml]`

use bn_daemon::config::Config;
use bn_daemon::lifecycle;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config_path =
        PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string()));

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bundlenewsd: {e}");
            std::process::exit(2);
        }
    };

    // Log to stderr and to a file next to the store.
    let log_dir = config.backend.db_path();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("bundlenewsd: cannot create {}: {e}", log_dir.display());
        std::process::exit(2);
    }
    let file_appender = tracing_appender::rolling::never(&log_dir, "bundlenewsd.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    info!(version = bn_daemon::VERSION, config = %config_path.display(), "bundlenews Usenet server");

    let daemon = match lifecycle::startup(config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    if tokio::signal::ctrl_c().await.is_err() {
        error!("cannot listen for shutdown signal, exiting");
    }
    info!("received shutdown signal");
    daemon.shutdown().await;
}
