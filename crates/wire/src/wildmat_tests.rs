// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

use super::*;
use yare::parameterized;

#[parameterized(
    exact = { "g.test", "g.test", true },
    star_all = { "*", "anything.at.all", true },
    star_prefix = { "g.*", "g.test", true },
    star_prefix_miss = { "g.*", "h.test", false },
    question = { "g.tes?", "g.test", true },
    question_miss = { "g.tes?", "g.tes", false },
    star_middle = { "g.*.d", "g.a.b.d", true },
    negation = { "g.*,!g.secret", "g.secret", false },
    negation_other = { "g.*,!g.secret", "g.public", true },
    last_wins = { "!g.a,g.a", "g.a", true },
    empty_pattern = { "", "g", false },
)]
fn wildmat_cases(pattern: &str, name: &str, expected: bool) {
    assert_eq!(wildmat_match(pattern, name), expected, "{pattern} vs {name}");
}
