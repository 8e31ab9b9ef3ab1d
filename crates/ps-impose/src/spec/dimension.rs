//! Dimensions with unit suffixes and paper names

use crate::constants::{POINTS_PER_CM, POINTS_PER_INCH, POINTS_PER_MM};
use crate::types::*;

/// Parse the longest numeric prefix of `s` the way C `strtod` does.
///
/// Returns the value and the number of bytes consumed, or `None` if `s`
/// does not start with a number.
pub fn parse_number_prefix(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if has_digits || frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    // Exponent only counts if at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    let text = &s[..end];
    let text = text.strip_suffix('.').unwrap_or(text);
    text.parse::<f64>().ok().map(|value| (value, end))
}

/// Parse a dimension such as `72`, `1in`, `2.5cm`, `10mm` or `0.5w`.
///
/// `w` and `h` multiply by the given paper width or height; using them
/// without a paper size is a configuration error.
pub fn parse_dimension(s: &str, width: Option<f64>, height: Option<f64>) -> Result<f64> {
    let (num, consumed) = parse_number_prefix(s)
        .ok_or_else(|| ImposeError::Dimension(format!("bad dimension `{s}'")))?;
    let unit = &s[consumed..];

    let factor = if unit.is_empty() || unit.starts_with("pt") {
        1.0
    } else if unit.starts_with("in") {
        POINTS_PER_INCH
    } else if unit.starts_with("cm") {
        POINTS_PER_CM
    } else if unit.starts_with("mm") {
        POINTS_PER_MM
    } else if unit.starts_with('w') {
        width.ok_or_else(|| ImposeError::Config("paper size not set".to_string()))?
    } else if unit.starts_with('h') {
        height.ok_or_else(|| ImposeError::Config("paper size not set".to_string()))?
    } else {
        return Err(ImposeError::Dimension(format!("bad dimension `{unit}'")));
    };

    Ok(num * factor)
}

/// Parse an absolute dimension (no paper-relative units)
pub fn parse_absolute_dimension(s: &str) -> Result<f64> {
    parse_dimension(s, None, None)
}

/// Parse a paper name (`a4`, `letter`) or explicit `WIDTHxHEIGHT` size
pub fn parse_paper(s: &str) -> Result<PageSize> {
    if let Some(paper) = PaperSize::from_name(s) {
        return Ok(paper.size());
    }

    let unknown = || ImposeError::Dimension(format!("paper size '{s}' unknown"));
    let (width_text, height_text) = s.split_once('x').ok_or_else(unknown)?;
    if width_text.is_empty() || height_text.is_empty() {
        return Err(unknown());
    }
    let width = parse_absolute_dimension(width_text).map_err(|_| unknown())?;
    let height = parse_absolute_dimension(height_text).map_err(|_| unknown())?;
    Ok(PageSize::new(width, height))
}
