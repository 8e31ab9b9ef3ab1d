//! Page range language
//!
//! A comma-separated list of `N`, `N-M`, `-M`, `N-` or `_`. An
//! underscore before a number counts from the end of the document
//! (`_1` is the last page); a bare `_` inserts a blank page.

use crate::types::*;

/// A run of 1-based page numbers, inclusive at both ends.
///
/// Negative numbers count from the end of the document. `0,0` is an
/// inserted blank page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub end: i64,
    /// The range as written, for error messages
    pub text: String,
}

impl Range {
    pub fn new(start: i64, end: i64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// An inserted blank page
    pub fn blank() -> Self {
        Self::new(0, 0, "_")
    }

    pub fn is_blank(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// Parse a comma-separated list of page ranges
pub fn parse_ranges(text: &str) -> Result<Vec<Range>> {
    text.split(',').map(parse_range).collect()
}

fn parse_range(text: &str) -> Result<Range> {
    if text == "_" {
        return Ok(Range::blank());
    }

    let invalid = || ImposeError::Range(text.to_string());

    let (start, end) = match text.split_once('-') {
        Some((start_text, end_text)) => {
            if start_text.is_empty() && end_text.is_empty() {
                return Err(invalid());
            }
            let start = if start_text.is_empty() {
                1
            } else {
                parse_endpoint(start_text).ok_or_else(invalid)?
            };
            let end = if end_text.is_empty() {
                -1
            } else {
                parse_endpoint(end_text).ok_or_else(invalid)?
            };
            (start, end)
        }
        None => {
            let page = parse_endpoint(text).ok_or_else(invalid)?;
            (page, page)
        }
    };

    Ok(Range::new(start, end, text))
}

/// `_?[0-9]+`
fn parse_endpoint(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('_') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
