//! Declarative query parser.
//!
//! Grammar (case-insensitive keywords):
//!
//! ```text
//! QUERY      := "SELECT" COLUMN_LIST "FROM" IDENTIFIER [ "WHERE" COND_LIST ] [ "LIMIT" INTEGER ]
//! COLUMN_LIST:= "*" | IDENTIFIER ("," IDENTIFIER)*
//! COND_LIST  := COND ("AND" COND)*
//! COND       := IDENTIFIER "=" VALUE          ; VALUE may be quoted with ' or "
//! ```
//!
//! The parser is deliberately lenient: each clause that cannot be located
//! yields an absent field rather than an error, so malformed input degrades
//! to a partially-empty specification. The table identifier after `FROM` is
//! discarded, since table binding is a connector-configuration concern.
//! Condition values stay literal strings; coercion, if any, is the
//! connector's call.
use std::collections::BTreeMap;

use quarry_common::models::QuerySpec;
use quarry_common::table::Scalar;

/// Parse a declarative query expression into a [`QuerySpec`].
pub fn parse(expression: &str) -> QuerySpec {
    let select_kw = find_keyword(expression, "select");
    let from_kw = find_keyword(expression, "from");
    let where_kw = find_keyword(expression, "where");
    let limit_kw = find_keyword(expression, "limit");

    let select = match (select_kw, from_kw) {
        (Some((_, select_end)), Some((from_start, _))) if select_end <= from_start => {
            parse_column_list(&expression[select_end..from_start])
        }
        _ => None,
    };

    let where_ = where_kw
        .map(|(_, where_end)| {
            let cond_end = limit_kw
                .map(|(limit_start, _)| limit_start)
                .filter(|limit_start| *limit_start >= where_end)
                .unwrap_or(expression.len());
            parse_conditions(&expression[where_end..cond_end])
        })
        .filter(|conditions| !conditions.is_empty());

    let limit = limit_kw.and_then(|(_, limit_end)| parse_limit(&expression[limit_end..]));

    QuerySpec {
        select,
        where_,
        limit,
    }
}

/// `*` anywhere in the list means "all columns" (absent select).
fn parse_column_list(text: &str) -> Option<Vec<String>> {
    let names: Vec<String> = text
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() || names.iter().any(|name| name == "*") {
        None
    } else {
        Some(names)
    }
}

fn parse_conditions(text: &str) -> BTreeMap<String, Scalar> {
    let mut conditions = BTreeMap::new();
    for part in split_standalone(text, "and") {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = strip_quotes(value.trim());
        conditions.insert(key.to_string(), Scalar::Str(value.to_string()));
    }
    conditions
}

fn parse_limit(text: &str) -> Option<usize> {
    let token = text.split_whitespace().next()?;
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// One layer of matching surrounding quotes (`'` or `"`) is removed.
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Locate `keyword` as a standalone, case-insensitive word; returns its
/// byte range. Words are delimited by whitespace or the text boundaries.
fn find_keyword(text: &str, keyword: &str) -> Option<(usize, usize)> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let needle = keyword.to_ascii_lowercase();

    let mut search_from = 0;
    while let Some(offset) = lower[search_from..].find(&needle) {
        let start = search_from + offset;
        let end = start + needle.len();
        let before_ok = start == 0 || bytes[start - 1].is_ascii_whitespace();
        let after_ok = end == bytes.len() || bytes[end].is_ascii_whitespace();
        if before_ok && after_ok {
            return Some((start, end));
        }
        search_from = start + 1;
    }
    None
}

/// Split on standalone occurrences of `word` (case-insensitive).
fn split_standalone(text: &str, word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some((start, end)) = find_keyword(rest, word) {
        parts.push(rest[..start].to_string());
        rest = &rest[end..];
    }
    parts.push(rest.to_string());
    parts
}
