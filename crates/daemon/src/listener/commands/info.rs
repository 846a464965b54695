// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! CAPABILITIES, DATE, HELP, MODE, QUIT.

use crate::listener::ListenCtx;
use bn_wire::{status, Response};
use chrono::Utc;

pub fn capabilities(ctx: &ListenCtx) -> Response {
    let mut lines = vec![
        "101 Capability list:".to_string(),
        "VERSION 2".to_string(),
        format!("IMPLEMENTATION bundlenews Usenet server v{}", crate::VERSION),
        "LIST ACTIVE NEWSGROUPS OVERVIEW.FMT SUBSCRIPTIONS".to_string(),
        "OVER MSGID".to_string(),
        "HDR".to_string(),
        "READER".to_string(),
    ];
    if ctx.config.nntp.posting_allowed() {
        lines.push("POST".to_string());
    }
    Response::multi(lines)
}

/// DATE: `111 yyyymmddhhmmss`, server UTC (RFC 3977 §7.1).
pub fn date() -> Response {
    Response::Line(status::server_date(&Utc::now().format("%Y%m%d%H%M%S").to_string()))
}

pub fn help() -> Response {
    Response::multi(vec![
        status::STATUS_HELPMSG.to_string(),
        "You're on your own.".to_string(),
    ])
}

/// MODE READER|STREAM. Streaming is not offered.
pub fn mode(args: &[String], ctx: &ListenCtx) -> Response {
    match args.first().map(String::as_str) {
        Some("reader") => {
            if ctx.config.nntp.posting_allowed() {
                Response::line(status::STATUS_POSTALLOWED)
            } else {
                Response::line(status::STATUS_NOPOSTMODE)
            }
        }
        Some("stream") => Response::line(status::ERR_NOSTREAM),
        _ => Response::line(status::ERR_CMDSYNTAXERROR),
    }
}

pub fn quit(args: &[String]) -> Response {
    if args.is_empty() {
        Response::line(status::STATUS_CLOSING)
    } else {
        Response::line(status::ERR_CMDSYNTAXERROR)
    }
}
