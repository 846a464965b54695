// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! GROUP and LISTGROUP.

use crate::listener::{ListenCtx, Session};
use bn_wire::{status, ArticleRange, Response};

/// GROUP ggg: select a group and its first article as current
/// (RFC 3977 §6.1.1). An empty group reports `211 0 0 0`.
pub fn group(args: &[String], session: &mut Session, ctx: &ListenCtx) -> Response {
    if args.len() != 1 {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    }
    let Some(group) = ctx.store.group_by_name(&args[0]) else {
        return Response::line(status::ERR_NOSUCHGROUP);
    };

    session.selected_article = ctx.store.first_article(group.id);
    let stats = ctx.store.group_stats(group.id);
    let line = match stats {
        Some(stats) => status::group_selected(stats.count, stats.low, stats.high, &group.name),
        None => status::group_selected(0, 0, 0, &group.name),
    };
    session.selected_group = Some(group);
    Response::Line(line)
}

/// LISTGROUP [group [range]]: article numbers in the group
/// (RFC 3977 §6.1.2).
pub fn listgroup(args: &[String], session: &mut Session, ctx: &ListenCtx) -> Response {
    if let Some(name) = args.first() {
        let Some(group) = ctx.store.group_by_name(name) else {
            return Response::line(status::ERR_NOSUCHGROUP);
        };
        session.selected_group = Some(group);
    }
    let Some(group) = session.selected_group.as_ref() else {
        return Response::line(status::ERR_NOGROUPSELECTED);
    };

    let articles = match args.get(1) {
        None => ctx.store.articles_in_range(group.id, 1, ctx.store.max_article_id()),
        Some(range) => match ArticleRange::parse(range) {
            Some(range) => {
                let (low, high) = range.bounds(ctx.store.max_article_id());
                ctx.store.articles_in_range(group.id, low, high)
            }
            None => return Response::line(status::ERR_NOTPERFORMED),
        },
    };

    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let low = ids.iter().min().copied().unwrap_or(0);
    let high = ids.iter().max().copied().unwrap_or(0);

    let mut lines = vec![status::listgroup(ids.len(), low, high, &group.name)];
    lines.extend(ids.iter().map(i64::to_string));
    Response::multi(lines)
}
