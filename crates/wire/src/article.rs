// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Raw article-buffer parsing for POST.

use std::collections::HashMap;

/// A posted article split into lowercase-keyed headers and a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RawArticle {
    /// Header lookup by lowercase name, empty string when absent.
    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Parse the line buffer collected between `POST` and the terminating `.`.
///
/// Headers run until the first empty line. `Name: value` stores under the
/// lowercased name; a line starting with whitespace folds into the previous
/// header (RFC 5322 folding). Anything else before the blank separator is a
/// fishy header and is ignored. The remaining lines, joined by `\n`, form
/// the body.
pub fn parse_article(lines: &[String]) -> RawArticle {
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut last_name = String::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        idx += 1;
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if !last_name.is_empty() {
                if let Some(value) = headers.get_mut(&last_name) {
                    value.push(' ');
                    value.push_str(line.trim());
                }
            }
        } else if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_lowercase();
            headers.insert(name.clone(), value.trim().to_string());
            last_name = name;
        }
    }

    // Tabs inside References confuse downstream tab-separated overview lines.
    if let Some(refs) = headers.get_mut("references") {
        *refs = refs.replace('\t', "");
    }

    let body = lines[idx.min(lines.len())..].join("\n");
    RawArticle { headers, body }
}

#[cfg(test)]
#[path = "article_tests.rs"]
mod tests;
