// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! The NNTP command dispatcher.
//!
//! Commands arrive lowercased; the table is static and unknown commands
//! answer `501`. Handlers get the session and the shared context and
//! return a [`Response`].

mod article;
mod group;
mod info;
mod list;
mod over;
mod post;

use super::{ListenCtx, Session};
use bn_wire::{status, Response};

/// Every command this server implements.
pub const AVAILABLE_COMMANDS: &[&str] = &[
    "article",
    "body",
    "capabilities",
    "current",
    "date",
    "group",
    "hdr",
    "head",
    "help",
    "last",
    "list",
    "listgroup",
    "mode",
    "newgroups",
    "newnews",
    "next",
    "over",
    "post",
    "quit",
    "stat",
    "xhdr",
    "xover",
];

pub fn dispatch(command: &str, args: &[String], session: &mut Session, ctx: &ListenCtx) -> Response {
    match command {
        "article" | "body" | "head" | "stat" => {
            article::head_body_stat(command, args, session, ctx)
        }
        "current" => article::current(args, ctx),
        "last" => article::last(session, ctx),
        "next" => article::next(session, ctx),
        "group" => group::group(args, session, ctx),
        "listgroup" => group::listgroup(args, session, ctx),
        "list" => list::list(args, ctx),
        "newgroups" => list::newgroups(args, ctx),
        "newnews" => list::newnews(args, ctx),
        "over" | "xover" => over::over(args, session, ctx),
        "hdr" | "xhdr" => over::hdr(args, session, ctx),
        "capabilities" => info::capabilities(ctx),
        "date" => info::date(),
        "help" => info::help(),
        "mode" => info::mode(args, ctx),
        "quit" => info::quit(args),
        "post" => post::post(session, ctx),
        _ => Response::line(status::ERR_CMDSYNTAXERROR),
    }
}
