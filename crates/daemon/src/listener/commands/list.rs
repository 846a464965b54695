// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! LIST and its keywords, NEWGROUPS, NEWNEWS.

use crate::listener::ListenCtx;
use bn_wire::{status, wildmat_match, Response};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const OVERVIEW_HEADERS: &[&str] = &[
    "Subject:",
    "From:",
    "Date:",
    "Message-ID:",
    "References:",
    ":bytes",
    ":lines",
    "Xref:full",
];

const LIST_HEADERS: &[&str] = &[
    "Subject",
    "From",
    "Date",
    "Message-ID",
    "References",
    ":bytes",
    ":lines",
    "Xref",
    "Newsgroups",
];

const EXTENSIONS: &[&str] = &[
    "XOVER",
    "XPAT",
    "LISTGROUP",
    "XGTITLE",
    "XHDR",
    "MODE",
    "OVER",
    "HDR",
    "AUTHINFO",
    "XROVER",
    "XVERSION",
];

/// LIST [keyword [wildmat]] (RFC 3977 §7.6). No keyword means ACTIVE.
pub fn list(args: &[String], ctx: &ListenCtx) -> Response {
    if args.len() > 2 {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    }

    let option = args.first().map(String::as_str);
    match option {
        None | Some("active") | Some("") => {
            let mut lines = vec![status::STATUS_LIST.to_string()];
            let post_flag = if ctx.config.nntp.posting_allowed() { "y" } else { "n" };
            for group in filtered_groups(ctx, args.get(1)) {
                let (high, low) = match ctx.store.group_stats(group.id) {
                    Some(stats) => (stats.high, stats.low),
                    None => (0, 0),
                };
                lines.push(format!("{} {high} {low} {post_flag}", group.name));
            }
            Response::multi(lines)
        }
        Some("newsgroups") => {
            let mut lines = vec![status::STATUS_LISTNEWSGROUPS.to_string()];
            for group in filtered_groups(ctx, args.get(1)) {
                let description = group.description.unwrap_or_default();
                lines.push(format!("{} {description}", group.name));
            }
            Response::multi(lines)
        }
        Some("overview.fmt") => keyword_block(status::STATUS_OVERVIEWFMT, OVERVIEW_HEADERS),
        Some("headers") => keyword_block(status::STATUS_OVERVIEWFMT, LIST_HEADERS),
        Some("extensions") => keyword_block(status::STATUS_EXTENSIONS, EXTENSIONS),
        Some("subscriptions") => keyword_block(status::STATUS_LISTSUBSCRIPTIONS, &[]),
        // distributions, active.times, distrib.pats
        Some(_) => Response::line(status::ERR_NOTPERFORMED),
    }
}

/// NEWGROUPS date time [GMT] (RFC 3977 §7.3).
pub fn newgroups(args: &[String], ctx: &ListenCtx) -> Response {
    if args.len() < 2 || args.len() > 3 || (args.len() == 3 && args[2] != "gmt") {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    }
    let Some(since) = parse_nntp_datetime(&args[0], &args[1]) else {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    };

    let post_flag = if ctx.config.nntp.posting_allowed() { "y" } else { "n" };
    let mut lines = vec![status::STATUS_NEWGROUPS.to_string()];
    for group in ctx.store.groups_since(since) {
        let (high, low) = match ctx.store.group_stats(group.id) {
            Some(stats) => (stats.high, stats.low),
            None => (0, 0),
        };
        lines.push(format!("{} {high} {low} {post_flag}", group.name));
    }
    Response::multi(lines)
}

/// NEWNEWS wildmat date time [GMT] (RFC 3977 §7.4).
pub fn newnews(args: &[String], ctx: &ListenCtx) -> Response {
    if args.len() < 3 || args.len() > 4 || (args.len() == 4 && args[3] != "gmt") {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    }
    let wildmat = &args[0];
    let Some(since) = parse_nntp_datetime(&args[1], &args[2]) else {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    };

    let matching: Vec<i64> = ctx
        .store
        .groups()
        .into_iter()
        .filter(|g| wildmat_match(wildmat, &g.name))
        .map(|g| g.id)
        .collect();

    let mut lines = vec![status::STATUS_NEWNEWS.to_string()];
    for article in ctx.store.articles_since(since) {
        if matching.contains(&article.newsgroup_id) {
            lines.push(article.message_id);
        }
    }
    Response::multi(lines)
}

fn keyword_block(first: &str, rest: &[&str]) -> Response {
    let mut lines = vec![first.to_string()];
    lines.extend(rest.iter().map(|s| s.to_string()));
    Response::multi(lines)
}

fn filtered_groups(ctx: &ListenCtx, pattern: Option<&String>) -> Vec<bn_core::Newsgroup> {
    ctx.store
        .groups()
        .into_iter()
        .filter(|g| pattern.map(|p| wildmat_match(p, &g.name)).unwrap_or(true))
        .collect()
}

/// `yymmdd|yyyymmdd` + `hhmmss`, GMT. Two-digit years: <= 69 is 20yy,
/// everything else 19yy (RFC 3977 §7.3.2).
pub(crate) fn parse_nntp_datetime(date_str: &str, time_str: &str) -> Option<DateTime<Utc>> {
    if !date_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (year, rest) = match date_str.len() {
        6 => {
            let yy: i32 = date_str[..2].parse().ok()?;
            (if yy <= 69 { 2000 + yy } else { 1900 + yy }, &date_str[2..])
        }
        8 => (date_str[..4].parse().ok()?, &date_str[4..]),
        _ => return None,
    };
    let month: u32 = rest[..2].parse().ok()?;
    let day: u32 = rest[2..].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if time_str.len() != 6 || !time_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = time_str[..2].parse().ok()?;
    let minute: u32 = time_str[2..4].parse().ok()?;
    let second: u32 = time_str[4..].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}
