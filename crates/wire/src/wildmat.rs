// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Wildmat matching for LIST / NEWNEWS group patterns (RFC 3977 §4).

/// Match `name` against a wildmat: comma-separated glob patterns where `*`
/// matches any run, `?` a single character, and a leading `!` negates. The
/// last matching pattern decides.
pub fn wildmat_match(pattern: &str, name: &str) -> bool {
    let mut matched = false;
    for part in pattern.split(',') {
        let (negated, glob) = match part.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, part),
        };
        if glob.is_empty() {
            continue;
        }
        if glob_match(glob.as_bytes(), name.as_bytes()) {
            matched = !negated;
        }
    }
    matched
}

fn glob_match(pattern: &[u8], name: &[u8]) -> bool {
    match (pattern.first(), name.first()) {
        (None, None) => true,
        (Some(b'*'), _) => {
            glob_match(&pattern[1..], name)
                || (!name.is_empty() && glob_match(pattern, &name[1..]))
        }
        (Some(b'?'), Some(_)) => glob_match(&pattern[1..], &name[1..]),
        (Some(p), Some(n)) if p == n => glob_match(&pattern[1..], &name[1..]),
        _ => false,
    }
}

#[cfg(test)]
#[path = "wildmat_tests.rs"]
mod tests;
