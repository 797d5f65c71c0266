//! Parser for resource-path query text (`a/b/c`).
//!
//! The path limit is an exact ceiling: more than `limit` segments is always
//! rejected, exactly `limit` segments is accepted.

use crate::error::{Result, UriqError};
use crate::settings::QueryOptionKind;

use super::token::QueryToken;

/// Parses path text into an `EndPath`/`InnerPath` chain.
pub fn parse_path(text: &str, limit: u32) -> Result<QueryToken> {
    let segments = split_segments(text)?;
    if segments.len() as u64 > u64::from(limit) {
        return Err(UriqError::RecursionLimitExceeded {
            option_kind: QueryOptionKind::Path,
            limit,
        });
    }
    Ok(build_segment_chain(&segments))
}

/// Splits and validates slash-separated identifier segments.
pub(crate) fn split_segments(text: &str) -> Result<Vec<String>> {
    if text.is_empty() {
        return Err(UriqError::SyntaxError {
            position: 0,
            message: "empty path".to_string(),
        });
    }
    let mut segments = Vec::new();
    let mut offset = 0;
    for segment in text.split('/') {
        validate_segment(segment, offset)?;
        segments.push(segment.to_string());
        offset += segment.len() + 1;
    }
    Ok(segments)
}

/// Builds the token chain for validated segments: inner segments become
/// `InnerPath` (or `DottedIdentifier` for cast segments), the last becomes
/// `EndPath`.
pub(crate) fn build_segment_chain(segments: &[String]) -> QueryToken {
    let mut parent: Option<QueryToken> = None;
    let (last, inner) = segments.split_last().expect("segments are never empty");
    for segment in inner {
        parent = Some(if segment.contains('.') {
            QueryToken::DottedIdentifier {
                name: segment.clone(),
                parent: parent.map(Box::new),
            }
        } else {
            QueryToken::inner_path(segment.clone(), parent)
        });
    }
    if last.contains('.') {
        QueryToken::DottedIdentifier {
            name: last.clone(),
            parent: parent.map(Box::new),
        }
    } else {
        QueryToken::end_path(last.clone(), parent)
    }
}

fn validate_segment(segment: &str, offset: usize) -> Result<()> {
    let mut chars = segment.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(UriqError::SyntaxError {
            position: offset,
            message: format!("invalid path segment '{segment}'"),
        })
    }
}
