// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! NNTP status lines (RFC 3977).
//!
//! Fixed lines are constants; parameterized ones are small format helpers.

pub const ERR_CMDSYNTAXERROR: &str = "501 command syntax error (or un-implemented option)";
pub const ERR_NOARTICLESELECTED: &str = "420 no current article has been selected";
pub const ERR_NOARTICLESINRANGE: &str = "423 No articles in that range";
pub const ERR_NOGROUPSELECTED: &str = "412 no newsgroup has been selected";
pub const ERR_NONEXTARTICLE: &str = "421 no next article in this group";
pub const ERR_NOPREVIOUSARTICLE: &str = "422 no previous article in this group";
pub const ERR_NOSTREAM: &str = "500 Command not understood";
pub const ERR_NOSUCHARTICLE: &str = "430 no such article";
pub const ERR_NOSUCHARTICLENUM: &str = "423 no such article in this group";
pub const ERR_NOSUCHGROUP: &str = "411 no such news group";
pub const ERR_NOTPERFORMED: &str = "503 program error, function not performed";
pub const STATUS_CLOSING: &str = "205 closing connection - goodbye!";
pub const STATUS_EXTENSIONS: &str = "215 Extensions supported by server.";
pub const STATUS_HEADERS_FOLLOW: &str = "225 Headers follow (multi-line)";
pub const STATUS_HELPMSG: &str = "100 Help text follows (multi-line)";
pub const STATUS_LIST: &str = "215 list of newsgroups follows";
pub const STATUS_LISTNEWSGROUPS: &str = "215 information follows";
pub const STATUS_LISTSUBSCRIPTIONS: &str = "215 list of default newsgroups follows";
pub const STATUS_NEWGROUPS: &str = "231 list of new newsgroups follows";
pub const STATUS_NEWNEWS: &str = "230 List of new articles follows (multi-line)";
pub const STATUS_NOPOSTMODE: &str = "201 Hello, you can't post";
pub const STATUS_OVERVIEWFMT: &str = "215 information follows";
pub const STATUS_POSTALLOWED: &str = "200 Hello, you can post";
pub const STATUS_POSTSUCCESSFUL: &str = "240 Article received ok";
pub const STATUS_READONLYSERVER: &str = "440 Posting not allowed";
pub const STATUS_SENDARTICLE: &str = "340 Send article to be posted";
pub const STATUS_XOVER: &str = "224 Overview information follows";

/// Connection greeting. `200` when posting is allowed, `201` otherwise.
pub fn greeting(hostname: &str, version: &str, posting_allowed: bool) -> String {
    if posting_allowed {
        format!("200 {hostname} bundlenews {version} server ready (posting allowed)")
    } else {
        format!("201 {hostname} bundlenews {version} server ready (no posting allowed)")
    }
}

pub fn article_follows(number: i64, message_id: &str) -> String {
    format!("220 {number} {message_id} All of the article follows")
}

pub fn head_follows(number: i64, message_id: &str) -> String {
    format!("221 {number} {message_id} article retrieved - head follows")
}

pub fn body_follows(number: i64, message_id: &str) -> String {
    format!("222 {number} {message_id} article retrieved - body follows")
}

pub fn article_exists(number: i64, message_id: &str) -> String {
    format!("223 {number} {message_id} Article exists")
}

pub fn article_found(number: i64, message_id: &str) -> String {
    format!("223 {number} {message_id} Article found")
}

pub fn group_selected(count: i64, first: i64, last: i64, name: &str) -> String {
    format!("211 {count} {first} {last} {name} group selected")
}

pub fn listgroup(number: usize, low: i64, high: i64, group: &str) -> String {
    format!("211 {number} {low} {high} {group}")
}

pub fn server_date(yyyymmddhhmmss: &str) -> String {
    format!("111 {yyyymmddhhmmss}")
}
