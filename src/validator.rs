//! Depth and count validation of bound `$expand` trees.

use tracing::warn;

use crate::binder::{SelectExpandClause, SelectedItem};
use crate::error::{Result, UriqError};

/// Walks a bound clause depth-first, enforcing the configured expansion
/// ceilings. Either ceiling may be None (unbounded).
///
/// The top-level clause is depth 0 and each expanded item's nested clause is
/// one deeper. Depth is checked before the item is counted and before its
/// subtree is visited, so a violation reports the depth that triggered it.
/// The item counter runs across the whole tree, never per branch.
pub fn validate_select_expand(
    clause: &SelectExpandClause,
    max_depth: Option<u32>,
    max_count: Option<u32>,
) -> Result<()> {
    let mut count = 0u32;
    let result = walk(clause, 0, &mut count, max_depth, max_count);
    if let Err(error) = &result {
        warn!(target: "uriq::validator", %error, "expansion validation failed");
    }
    result
}

fn walk(
    clause: &SelectExpandClause,
    depth: u32,
    count: &mut u32,
    max_depth: Option<u32>,
    max_count: Option<u32>,
) -> Result<()> {
    for item in &clause.selected_items {
        let SelectedItem::ExpandedNavigation(expanded) = item else {
            continue;
        };
        let nested_depth = depth + 1;
        if let Some(limit) = max_depth {
            if nested_depth > limit {
                return Err(UriqError::ExpandDepthExceeded {
                    depth: nested_depth,
                    limit,
                });
            }
        }
        *count += 1;
        if let Some(limit) = max_count {
            if *count > limit {
                return Err(UriqError::ExpandCountExceeded {
                    count: *count,
                    limit,
                });
            }
        }
        walk(&expanded.select_expand, nested_depth, count, max_depth, max_count)?;
    }
    Ok(())
}
