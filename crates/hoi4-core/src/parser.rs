//! Pattern-based extraction and rewriting for state file text
//!
//! State files use a brace-delimited format. Only two fragments matter here:
//! the state id (`state={ ... id = N`) and the first `provinces={ ... }` block.
//! Nothing else in the file is interpreted.

use crate::error::{Error, Result};
use crate::state::{ProvinceId, ProvincesBlock, StateId};
use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref STATE_ID: Regex =
        Regex::new(r"\bstate\s*=\s*\{(?s:.*?)\bid\s*=\s*(\d+)").expect("state id regex");
    static ref PROVINCES_OPEN: Regex =
        Regex::new(r"\bprovinces\s*=\s*\{").expect("provinces regex");
    static ref NUMBER: Regex = Regex::new(r"\d+").expect("number regex");
}

/// Extract the state identifier, or `None` if the text declares no state
pub fn parse_state_id(content: &str) -> Option<StateId> {
    STATE_ID
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Locate the first provinces block and read its IDs
///
/// The block ends at the first closing brace. An opening brace before that
/// point means nested braces, which this format reader does not support, so
/// the block is reported as malformed instead of being misread.
pub fn find_provinces_block(content: &str) -> ProvincesBlock {
    let open = match PROVINCES_OPEN.find(content) {
        Some(m) => m,
        None => return ProvincesBlock::Missing,
    };

    let body_start = open.end();
    let rest = &content[body_start..];

    let close = match rest.find(|c: char| c == '{' || c == '}') {
        Some(i) if rest.as_bytes()[i] == b'}' => i,
        Some(_) => {
            return ProvincesBlock::Malformed {
                reason: "nested braces are not supported inside a provinces block".to_string(),
            }
        }
        None => {
            return ProvincesBlock::Malformed {
                reason: "provinces block is never closed".to_string(),
            }
        }
    };

    let mut ids = Vec::new();
    for m in NUMBER.find_iter(&rest[..close]) {
        match m.as_str().parse::<ProvinceId>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                return ProvincesBlock::Malformed {
                    reason: format!("province ID '{}' is out of range", m.as_str()),
                }
            }
        }
    }

    ProvincesBlock::Present {
        span: open.start()..body_start + close + 1,
        ids,
    }
}

/// Join IDs with single spaces
pub fn join_ids(ids: &[ProvinceId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a provinces block in canonical form
pub fn render_provinces_block(ids: &[ProvinceId]) -> String {
    format!("provinces={{\n\t{}\n}}", join_ids(ids))
}

/// Replace the block at `span` with a freshly rendered one
pub fn splice_provinces_block(content: &str, span: &Range<usize>, ids: &[ProvinceId]) -> String {
    let block = render_provinces_block(ids);
    let mut out = String::with_capacity(content.len() + block.len());
    out.push_str(&content[..span.start]);
    out.push_str(&block);
    out.push_str(&content[span.end..]);
    out
}

/// Parse whitespace-separated positive integers typed by a user
pub fn parse_id_list(text: &str) -> Result<Vec<u32>> {
    let ids = text
        .split_whitespace()
        .map(parse_id)
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(Error::InvalidInput(
            "please enter at least one province ID".to_string(),
        ));
    }

    Ok(ids)
}

/// Parse a single positive integer typed by a user
pub fn parse_id(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a positive integer",
            trimmed
        )));
    }

    match trimmed.parse::<u32>() {
        Ok(0) => Err(Error::InvalidInput("IDs must be positive, got 0".to_string())),
        Ok(id) => Ok(id),
        Err(_) => Err(Error::InvalidInput(format!("'{}' is out of range", trimmed))),
    }
}
