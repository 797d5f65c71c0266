//! Parsers for `$select` and `$expand` option text.
//!
//! `$select` is a comma list of slash-paths or `*`. `$expand` is a comma list
//! of navigation names, each with optional parenthesized nested options
//! (`$select=...;$expand=...`). Every nested `$expand` consumes one level of
//! the shared select/expand recursion limit and aborts immediately when the
//! limit is crossed.

use crate::error::{Result, UriqError};
use crate::settings::QueryOptionKind;

use super::path::{build_segment_chain, split_segments};
use super::token::{ExpandTermToken, ExpandToken, QueryToken, SelectToken};

/// Parses `$select` text.
pub fn parse_select(text: &str) -> Result<SelectToken> {
    let mut selected = Vec::new();
    for term in split_top_level(text, ',') {
        let term = term.trim();
        if term == "*" {
            selected.push(QueryToken::Star);
        } else {
            let segments = split_segments(term)?;
            selected.push(build_segment_chain(&segments));
        }
    }
    if selected.is_empty() {
        return Err(UriqError::SyntaxError {
            position: 0,
            message: "empty $select".to_string(),
        });
    }
    Ok(SelectToken { selected })
}

/// Parses `$expand` text with the shared select/expand recursion limit.
pub fn parse_expand(text: &str, limit: u32) -> Result<ExpandToken> {
    parse_expand_at(text, limit, 1)
}

fn parse_expand_at(text: &str, limit: u32, depth: u32) -> Result<ExpandToken> {
    if depth > limit {
        return Err(UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::SelectExpand,
            limit,
        });
    }
    let mut terms = Vec::new();
    for term in split_top_level(text, ',') {
        terms.push(parse_term(term.trim(), limit, depth)?);
    }
    if terms.is_empty() {
        return Err(UriqError::SyntaxError {
            position: 0,
            message: "empty $expand".to_string(),
        });
    }
    Ok(ExpandToken { terms })
}

fn parse_term(term: &str, limit: u32, depth: u32) -> Result<ExpandTermToken> {
    let (navigation, options) = match term.find('(') {
        Some(open) => {
            if !term.ends_with(')') {
                return Err(UriqError::SyntaxError {
                    position: term.len(),
                    message: "expected ')' closing expand options".to_string(),
                });
            }
            (&term[..open], Some(&term[open + 1..term.len() - 1]))
        }
        None => (term, None),
    };
    let navigation = navigation.trim();
    if navigation.is_empty() {
        return Err(UriqError::SyntaxError {
            position: 0,
            message: "empty expand term".to_string(),
        });
    }

    let mut select = None;
    let mut expand = None;
    if let Some(options) = options {
        for option in split_top_level(options, ';') {
            let option = option.trim();
            if option.is_empty() {
                continue;
            }
            let Some((name, value)) = option.split_once('=') else {
                return Err(UriqError::SyntaxError {
                    position: 0,
                    message: format!("malformed expand option '{option}'"),
                });
            };
            match name.trim() {
                "$select" => select = Some(parse_select(value.trim())?),
                "$expand" => {
                    expand = Some(parse_expand_at(value.trim(), limit, depth + 1)?);
                }
                other => {
                    return Err(UriqError::UnsupportedQueryOption(other.to_string()));
                }
            }
        }
    }

    Ok(ExpandTermToken {
        navigation: navigation.to_string(),
        select,
        expand,
    })
}

/// Splits on a separator at parenthesis depth zero.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
