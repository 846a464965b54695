// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! OVER / XOVER and HDR / XHDR.

use super::article::format_date;
use crate::listener::{ListenCtx, Session};
use bn_core::Article;
use bn_wire::{status, ArticleRange, Response};

/// OVER [message-id|range] (RFC 3977 §8.3). Eight tab-separated fields
/// plus Xref, one line per article.
pub fn over(args: &[String], session: &mut Session, ctx: &ListenCtx) -> Response {
    let articles = match args.first() {
        None => {
            if session.selected_group.is_none() {
                return Response::line(status::ERR_NOGROUPSELECTED);
            }
            let Some(current) = session.selected_article.clone() else {
                return Response::line(status::ERR_NOARTICLESELECTED);
            };
            vec![current]
        }
        Some(arg) if arg.contains('<') && arg.contains('>') => {
            match ctx.store.article_by_message_id(arg) {
                Some(article) => vec![article],
                None => return Response::line(status::ERR_NOSUCHARTICLE),
            }
        }
        Some(arg) => {
            let Some(group) = session.selected_group.as_ref() else {
                return Response::line(status::ERR_NOGROUPSELECTED);
            };
            let Some(range) = ArticleRange::parse(arg) else {
                return Response::line(status::ERR_NOTPERFORMED);
            };
            let (low, high) = range.bounds(ctx.store.max_article_id());
            let articles = ctx.store.articles_in_range(group.id, low, high);
            if articles.is_empty() {
                return Response::line(status::ERR_NOSUCHARTICLENUM);
            }
            articles
        }
    };

    let mut lines = vec![status::STATUS_XOVER.to_string()];
    for article in &articles {
        lines.push(overview_line(article, ctx));
    }
    Response::multi(lines)
}

/// HDR field [message-id|range] (RFC 3977 §8.5). Without an identifier the
/// current article is used; a message-id target reports article number 0.
pub fn hdr(args: &[String], session: &mut Session, ctx: &ListenCtx) -> Response {
    let Some(field) = args.first() else {
        return Response::line(status::ERR_CMDSYNTAXERROR);
    };

    let mut by_message_id = false;
    let articles: Vec<Article> = match args.get(1) {
        Some(arg) if arg.contains('<') && arg.contains('>') => {
            by_message_id = true;
            match ctx.store.article_by_message_id(arg) {
                Some(article) => vec![article],
                None => return Response::line(status::ERR_NOSUCHARTICLE),
            }
        }
        Some(arg) => {
            let Some(group) = session.selected_group.as_ref() else {
                return Response::line(status::ERR_NOGROUPSELECTED);
            };
            let Some(range) = ArticleRange::parse(arg) else {
                return Response::line(status::ERR_NOTPERFORMED);
            };
            let (low, high) = range.bounds(ctx.store.max_article_id());
            let articles = ctx.store.articles_in_range(group.id, low, high);
            if articles.is_empty() {
                return Response::line(status::ERR_NOARTICLESINRANGE);
            }
            articles
        }
        None => {
            if session.selected_group.is_none() {
                return Response::line(status::ERR_NOGROUPSELECTED);
            }
            let Some(current) = session.selected_article.clone() else {
                return Response::line(status::ERR_NOARTICLESELECTED);
            };
            vec![current]
        }
    };

    let mut lines = vec![status::STATUS_HEADERS_FOLLOW.to_string()];
    for article in &articles {
        let number = if by_message_id { 0 } else { article.id };
        lines.push(format!("{number} {}", header_value(article, field, ctx)));
    }
    Response::multi(lines)
}

fn overview_line(article: &Article, ctx: &ListenCtx) -> String {
    let group_name = ctx
        .store
        .group_by_id(article.newsgroup_id)
        .map(|g| g.name)
        .unwrap_or_default();
    let xref = format!("Xref: {} {group_name}:{}", ctx.config.nntp.hostname, article.id);
    [
        article.id.to_string(),
        article.subject.clone(),
        article.from.clone(),
        format_date(article),
        article.message_id.clone(),
        article.references.clone(),
        article.byte_len().to_string(),
        article.line_count().to_string(),
        xref,
    ]
    .join("\t")
}

/// Header field lookup, including the synthetic `:bytes` / `:lines` /
/// `xref` metadata fields. Unknown fields yield an empty value.
fn header_value(article: &Article, field: &str, ctx: &ListenCtx) -> String {
    match field {
        "subject" => article.subject.clone(),
        "from" => article.from.clone(),
        "date" => format_date(article),
        "message-id" => article.message_id.clone(),
        "references" => article.references.clone(),
        "newsgroups" => ctx
            .store
            .group_by_id(article.newsgroup_id)
            .map(|g| g.name)
            .unwrap_or_default(),
        ":bytes" => article.byte_len().to_string(),
        ":lines" => article.line_count().to_string(),
        "xref" => {
            let group_name = ctx
                .store
                .group_by_id(article.newsgroup_id)
                .map(|g| g.name)
                .unwrap_or_default();
            format!("{} {group_name}:{}", ctx.config.nntp.hostname, article.id)
        }
        _ => String::new(),
    }
}
