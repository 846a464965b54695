// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! NNTP listener: accepts TCP connections and runs one session task per
//! reader.
//!
//! A session is a line loop with three modes: command dispatch, POST
//! collection (lines buffered until a lone `.`), and an empty-request
//! flood counter that closes chatty broken clients. Reads carry a long
//! deadline; shutdown cancels the accept loop and lets sessions finish
//! their current line.

pub mod commands;

use crate::config::Config;
use crate::spool::Spool;
use bn_core::{Article, Newsgroup};
use bn_storage::Store;
use bn_wire::{status, Response};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Shared context for all sessions.
pub struct ListenCtx {
    pub store: Arc<Store>,
    pub spool: Arc<Spool>,
    pub config: Arc<Config>,
}

/// Per-connection reader state.
#[derive(Default)]
pub struct Session {
    pub selected_group: Option<Newsgroup>,
    pub selected_article: Option<Article>,
    pub post_mode: bool,
    pub article_buffer: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The accept loop.
pub struct Listener {
    tcp: TcpListener,
    ctx: Arc<ListenCtx>,
    cancel: CancellationToken,
}

impl Listener {
    pub async fn bind(ctx: Arc<ListenCtx>, cancel: CancellationToken) -> std::io::Result<Self> {
        let addr = (ctx.config.nntp.host.as_str(), ctx.config.nntp.port);
        let tcp = TcpListener::bind(addr).await?;
        info!(addr = %tcp.local_addr()?, "NNTP listener bound");
        Ok(Self { tcp, ctx, cancel })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.tcp.local_addr()
    }

    /// Accept connections until shutdown, one task per session.
    pub async fn run(self) {
        loop {
            tokio::select! {
                result = self.tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "client connected");
                        let ctx = Arc::clone(&self.ctx);
                        let cancel = self.cancel.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, ctx, cancel).await {
                                debug!(%addr, error = %e, "session ended with error");
                            }
                            debug!(%addr, "client disconnected");
                        });
                    }
                    Err(e) => error!(error = %e, "accept error"),
                },
                _ = self.cancel.cancelled() => return,
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    ctx: Arc<ListenCtx>,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let greeting = status::greeting(
        &ctx.config.nntp.hostname,
        crate::VERSION,
        ctx.config.nntp.posting_allowed(),
    );
    send_response(&mut writer, &Response::Line(greeting)).await?;

    let mut session = Session::new();
    let mut empty_requests = 0u32;

    loop {
        let mut line = String::new();
        let read = tokio::select! {
            result = tokio::time::timeout(ctx.config.nntp.read_timeout(), reader.read_line(&mut line)) => result,
            _ = cancel.cancelled() => return Ok(()),
        };
        let n = match read {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!("read deadline elapsed on session socket");
                continue;
            }
        };
        if n == 0 {
            return Ok(()); // EOF
        }

        if session.post_mode {
            // Only right-trim so body indentation survives.
            let data = line.trim_end_matches(['\r', '\n']);
            if data == "." {
                let response = match ctx.spool.post(&session.article_buffer).await {
                    Ok(()) => Response::line(status::STATUS_POSTSUCCESSFUL),
                    Err(e) => {
                        error!(error = %e, "could not accept posted article");
                        Response::line(status::ERR_NOTPERFORMED)
                    }
                };
                session.post_mode = false;
                session.article_buffer.clear();
                send_response(&mut writer, &response).await?;
            } else {
                session.article_buffer.push(data.to_string());
            }
            continue;
        }

        let lowered = line.trim().to_lowercase();
        let mut tokens = lowered.split_whitespace();
        let Some(command) = tokens.next() else {
            empty_requests += 1;
            if empty_requests >= ctx.config.nntp.max_empty_requests {
                warn!("closing session: too many empty requests");
                return Ok(());
            }
            continue;
        };
        empty_requests = 0;
        let args: Vec<String> = tokens.map(str::to_string).collect();
        debug!(command, ?args, "dispatching");

        let response = commands::dispatch(command, &args, &mut session, &ctx);
        send_response(&mut writer, &response).await?;

        if command == "quit" {
            return Ok(());
        }
    }
}

/// Write a response; multi-line blocks get the `.` terminator.
async fn send_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> std::io::Result<()> {
    match response {
        Response::Line(line) => {
            writer.write_all(format!("{line}\r\n").as_bytes()).await?;
        }
        Response::Multi(lines) => {
            for line in lines {
                writer.write_all(format!("{line}\r\n").as_bytes()).await?;
            }
            writer.write_all(b".\r\n").await?;
        }
    }
    writer.flush().await
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
