//! Page specification language
//!
//! ```text
//! PAGESPECS = [MODULO:]SPEC(,SPEC)*
//! SPEC      = PLACEMENT(+PLACEMENT)*
//! PLACEMENT = [-]PAGENO[L|R|U|H|V...][@SCALE][(XOFF,YOFF)]
//! ```
//!
//! Each comma-separated `SPEC` is one output page; the `+`-joined
//! placements in it are drawn on top of each other on that page.

use super::dimension::parse_dimension;
use crate::constants::SPEC_USAGE;
use crate::types::*;

/// One instruction to draw a source page on an output page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    /// Position within the modulo cycle
    pub page_number: usize,
    /// Count `page_number` from the end of the document instead of the
    /// start of the cycle
    pub reversed: bool,
    /// Rotation in degrees, anticlockwise, in `[0, 360)`
    pub rotate: i32,
    /// Mirror left to right
    pub hflip: bool,
    /// Mirror top to bottom
    pub vflip: bool,
    pub scale: f64,
    /// Horizontal offset in points
    pub xoff: f64,
    /// Vertical offset in points
    pub yoff: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page_number: 0,
            reversed: false,
            rotate: 0,
            hflip: false,
            vflip: false,
            scale: 1.0,
            xoff: 0.0,
            yoff: 0.0,
        }
    }
}

impl PageSpec {
    /// True if drawing this placement changes the coordinate system
    pub fn has_transform(&self) -> bool {
        self.rotate != 0
            || self.hflip
            || self.vflip
            || self.scale != 1.0
            || self.xoff != 0.0
            || self.yoff != 0.0
    }

    /// Index into the page list of the page this placement draws, for
    /// the cycle starting at `pagebase`.
    ///
    /// `maxpage` is the padded page count (a multiple of `modulo`).
    pub fn page_index(&self, maxpage: usize, modulo: usize, pagebase: usize) -> usize {
        let base = if self.reversed {
            maxpage - pagebase - modulo
        } else {
            pagebase
        };
        base + self.page_number
    }
}

/// A parsed page specification: what goes on each output page of one
/// cycle of `modulo` input pages
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSet {
    pub modulo: usize,
    /// Placements grouped by output page
    pub pages: Vec<Vec<PageSpec>>,
    /// Whether any placement flips its page
    pub flipping: bool,
}

impl SpecSet {
    /// Output pages written per cycle
    pub fn pages_per_cycle(&self) -> usize {
        self.pages.len()
    }

    /// True if any output page combines pages or transforms one
    pub fn any_transform(&self) -> bool {
        self.pages
            .iter()
            .any(|page| page.len() > 1 || page.iter().any(PageSpec::has_transform))
    }
}

fn spec_error() -> ImposeError {
    ImposeError::Spec(SPEC_USAGE.to_string())
}

/// Parse a page specification.
///
/// `width` and `height` resolve `w` and `h` units in offsets.
pub fn parse_specs(text: &str, width: Option<f64>, height: Option<f64>) -> Result<SpecSet> {
    let (modulo, specs_text) = match text.split_once(':') {
        Some((modulo_text, rest)) => {
            let modulo = modulo_text
                .trim()
                .parse::<usize>()
                .map_err(|_| spec_error())?;
            (modulo, rest)
        }
        None => (1, text),
    };
    if modulo == 0 {
        return Err(spec_error());
    }

    let mut flipping = false;
    let mut pages = Vec::new();
    for page_text in split_outside_parens(specs_text) {
        let mut placements = Vec::new();
        for placement_text in page_text.split('+') {
            let spec = parse_placement(placement_text, width, height)?;
            if spec.page_number >= modulo {
                return Err(spec_error());
            }
            flipping |= spec.hflip || spec.vflip;
            placements.push(spec);
        }
        pages.push(placements);
    }

    Ok(SpecSet {
        modulo,
        pages,
        flipping,
    })
}

/// Split on commas that are not inside an offset group
fn split_outside_parens(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_placement(text: &str, width: Option<f64>, height: Option<f64>) -> Result<PageSpec> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut spec = PageSpec::default();

    if bytes.first() == Some(&b'-') {
        spec.reversed = true;
        pos += 1;
    }

    let digits_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    if pos == digits_start {
        return Err(spec_error());
    }
    spec.page_number = text[digits_start..pos]
        .parse()
        .map_err(|_| spec_error())?;

    while let Some(&c) = bytes.get(pos) {
        match c.to_ascii_uppercase() {
            b'L' => spec.rotate += 90,
            b'R' => spec.rotate -= 90,
            b'U' => spec.rotate += 180,
            b'H' => spec.hflip = !spec.hflip,
            b'V' => spec.vflip = !spec.vflip,
            _ => break,
        }
        pos += 1;
    }

    if bytes.get(pos) == Some(&b'@') {
        pos += 1;
        let scale_start = pos;
        while bytes.get(pos).is_some_and(|c| *c != b'(' && *c != b')') {
            pos += 1;
        }
        let scale: f64 = text[scale_start..pos]
            .trim()
            .parse()
            .map_err(|_| spec_error())?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(spec_error());
        }
        spec.scale = scale;
    }

    if bytes.get(pos) == Some(&b'(') {
        let group = text[pos + 1..]
            .strip_suffix(')')
            .ok_or_else(spec_error)?;
        let (x_text, y_text) = group.split_once(',').ok_or_else(spec_error)?;
        if !is_offset_token(x_text) || !is_offset_token(y_text) {
            return Err(spec_error());
        }
        spec.xoff = parse_dimension(x_text, width, height)?;
        spec.yoff = parse_dimension(y_text, width, height)?;
        pos = text.len();
    }

    if pos != text.len() {
        return Err(spec_error());
    }

    // A page flipped both ways is the same page turned upside down
    if spec.hflip && spec.vflip {
        spec.hflip = false;
        spec.vflip = false;
        spec.rotate += 180;
    }
    spec.rotate = spec.rotate.rem_euclid(360);

    Ok(spec)
}

/// `-?[0-9.a-z]+`, ignoring case
fn is_offset_token(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    !body.is_empty()
        && body
            .bytes()
            .all(|c| c.is_ascii_digit() || c == b'.' || c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_outside_parens() {
        assert_eq!(
            split_outside_parens("0(1,2),1(-3,4)+2"),
            vec!["0(1,2)", "1(-3,4)+2"]
        );
        assert_eq!(split_outside_parens("0"), vec!["0"]);
    }

    #[test]
    fn test_rotation_accumulates() {
        let spec = parse_placement("0LLRVHVHV(700pt,0pt)", None, None).unwrap();
        // L+L-R = 90; flips: V H V H V -> vflip only
        assert_eq!(spec.rotate, 90);
        assert!(spec.vflip);
        assert!(!spec.hflip);
        assert_eq!(spec.xoff, 700.0);
    }

    #[test]
    fn test_both_flips_become_rotation() {
        let spec = parse_placement("0HV", None, None).unwrap();
        assert!(!spec.hflip);
        assert!(!spec.vflip);
        assert_eq!(spec.rotate, 180);

        let spec = parse_placement("0UHV", None, None).unwrap();
        assert_eq!(spec.rotate, 0);
    }

    #[test]
    fn test_lowercase_modifiers() {
        let spec = parse_placement("3r@0.5", None, None).unwrap();
        assert_eq!(spec.page_number, 3);
        assert_eq!(spec.rotate, 270);
        assert_eq!(spec.scale, 0.5);
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse_placement("0(1,2)x", None, None).is_err());
        assert!(parse_placement("0Q", None, None).is_err());
        assert!(parse_placement("-", None, None).is_err());
        assert!(parse_placement("0(1)", None, None).is_err());
        assert!(parse_placement("0@0", None, None).is_err());
    }
}
