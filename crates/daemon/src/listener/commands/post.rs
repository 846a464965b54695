// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! POST (RFC 3977 §6.3.1). Flips the session into collection mode; the
//! buffered article is handed to the spool engine when the client sends
//! the terminating `.`.

use crate::listener::{ListenCtx, Session};
use bn_wire::{status, Response};
use tracing::debug;

pub fn post(session: &mut Session, ctx: &ListenCtx) -> Response {
    if !ctx.config.nntp.posting_allowed() {
        return Response::line(status::STATUS_READONLYSERVER);
    }
    debug!("switching session to post mode");
    session.post_mode = true;
    session.article_buffer.clear();
    Response::line(status::STATUS_SENDARTICLE)
}
