// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! ARTICLE / HEAD / BODY / STAT, the LAST / NEXT pointer moves, and the
//! CURRENT overview extension.

use crate::listener::{ListenCtx, Session};
use bn_core::Article;
use bn_wire::{status, Response};

/// ARTICLE and friends share target resolution (RFC 3977 §6.2.1): by
/// message-id, by number in the selected group, or the current article.
pub fn head_body_stat(
    command: &str,
    args: &[String],
    session: &mut Session,
    ctx: &ListenCtx,
) -> Response {
    let article = match resolve_target(args, session, ctx) {
        Ok(article) => article,
        Err(response) => return response,
    };
    session.selected_article = Some(article.clone());

    let group_name = ctx
        .store
        .group_by_id(article.newsgroup_id)
        .map(|g| g.name)
        .unwrap_or_default();

    match command {
        "head" => {
            let mut lines = vec![status::head_follows(article.id, &article.message_id)];
            lines.extend(header_lines(&article, &group_name, ctx));
            Response::multi(lines)
        }
        "body" => {
            let mut lines = vec![status::body_follows(article.id, &article.message_id)];
            lines.extend(article.body.split('\n').map(str::to_string));
            Response::multi(lines)
        }
        "stat" => Response::line(status::article_exists(article.id, &article.message_id)),
        _ => {
            let mut lines = vec![status::article_follows(article.id, &article.message_id)];
            lines.extend(header_lines(&article, &group_name, ctx));
            lines.push(String::new());
            lines.extend(article.body.split('\n').map(str::to_string));
            Response::multi(lines)
        }
    }
}

/// LAST: move the current article pointer to the previous number.
pub fn last(session: &mut Session, ctx: &ListenCtx) -> Response {
    step(session, ctx, |store, group_id, id| store.article_before(group_id, id), status::ERR_NOPREVIOUSARTICLE)
}

/// NEXT: move the current article pointer to the following number.
pub fn next(session: &mut Session, ctx: &ListenCtx) -> Response {
    step(session, ctx, |store, group_id, id| store.article_after(group_id, id), status::ERR_NONEXTARTICLE)
}

/// CURRENT [n], non-standard: overview lines for the n most recently
/// created articles across every group (for the web frontend).
pub fn current(args: &[String], ctx: &ListenCtx) -> Response {
    let limit = args
        .first()
        .and_then(|arg| arg.parse::<usize>().ok())
        .unwrap_or(10);

    let mut lines = vec![status::STATUS_XOVER.to_string()];
    for article in ctx.store.newest_articles(limit) {
        let group_name = ctx
            .store
            .group_by_id(article.newsgroup_id)
            .map(|g| g.name)
            .unwrap_or_default();
        lines.push(
            [
                article.id.to_string(),
                article.subject.clone(),
                article.from.clone(),
                format_date(&article),
                article.message_id.clone(),
                group_name,
                article.references.clone(),
                article.byte_len().to_string(),
                article.line_count().to_string(),
            ]
            .join("\t"),
        );
    }
    Response::multi(lines)
}

fn step(
    session: &mut Session,
    ctx: &ListenCtx,
    pick: impl Fn(&bn_storage::Store, i64, i64) -> Option<Article>,
    exhausted: &str,
) -> Response {
    let Some(group) = session.selected_group.clone() else {
        return Response::line(status::ERR_NOGROUPSELECTED);
    };
    let Some(current) = session.selected_article.clone() else {
        return Response::line(status::ERR_NOARTICLESELECTED);
    };
    match pick(&ctx.store, group.id, current.id) {
        Some(article) => {
            let line = status::article_found(article.id, &article.message_id);
            session.selected_article = Some(article);
            Response::Line(line)
        }
        None => Response::line(exhausted),
    }
}

fn resolve_target(
    args: &[String],
    session: &mut Session,
    ctx: &ListenCtx,
) -> Result<Article, Response> {
    let identifier = args.first();
    let by_message_id =
        identifier.map(|arg| arg.contains('<') && arg.contains('>')).unwrap_or(false);

    if by_message_id {
        let arg = identifier.map(String::as_str).unwrap_or_default();
        return ctx
            .store
            .article_by_message_id(arg)
            .ok_or_else(|| Response::line(status::ERR_NOSUCHARTICLE));
    }

    if let Some(number) = identifier {
        let Some(group) = session.selected_group.as_ref() else {
            return Err(Response::line(status::ERR_NOGROUPSELECTED));
        };
        let Ok(number) = number.parse::<i64>() else {
            return Err(Response::line(status::ERR_NOARTICLESELECTED));
        };
        return ctx
            .store
            .article_by_number(group.id, number)
            .ok_or_else(|| Response::line(status::ERR_NOSUCHARTICLENUM));
    }

    if session.selected_group.is_none() {
        return Err(Response::line(status::ERR_NOGROUPSELECTED));
    }
    session
        .selected_article
        .clone()
        .ok_or_else(|| Response::line(status::ERR_NOARTICLESELECTED))
}

/// The reconstructed header block of an article response.
fn header_lines(article: &Article, group_name: &str, ctx: &ListenCtx) -> Vec<String> {
    let hostname = &ctx.config.nntp.hostname;
    let mut lines = vec![
        format!("Path: {hostname}"),
        format!("From: {}", article.from),
        format!("Newsgroups: {group_name}"),
        format!("Date: {}", format_date(article)),
        format!("Subject: {}", article.subject),
        format!("Message-ID: {}", article.message_id),
        format!("Xref: {hostname} {group_name}:{}", article.id),
        format!("References: {}", article.references),
    ];
    if let Some(organization) = &article.organization {
        lines.push(format!("Organization: {organization}"));
    }
    if let Some(user_agent) = &article.user_agent {
        lines.push(format!("User-Agent: {user_agent}"));
    }
    lines
}

pub(crate) fn format_date(article: &Article) -> String {
    article.created_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
