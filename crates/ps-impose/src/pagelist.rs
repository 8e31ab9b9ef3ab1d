//! Resolution of page ranges into the ordered list of pages to output

use crate::spec::Range;
use crate::types::*;

/// Turn a possibly end-relative 1-based page number into an absolute one.
///
/// Negative numbers count back from `total_pages` (`-1` is the last page)
/// and are clamped to the first page.
pub fn absolute_page(n: i64, total_pages: usize) -> i64 {
    if n < 0 {
        (n + total_pages as i64 + 1).max(1)
    } else {
        n
    }
}

/// The ordered pages selected for output.
///
/// Entries are 0-based source page indices, or `None` for an inserted
/// blank page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageList {
    pages: Vec<Option<usize>>,
}

impl PageList {
    /// Resolve `ranges` against a document of `total_pages` pages.
    ///
    /// `odd` alone keeps odd-numbered pages, `even` alone keeps
    /// even-numbered pages; both or neither keep everything. `reverse`
    /// reverses the whole list once all ranges are resolved.
    pub fn new(
        total_pages: usize,
        ranges: &[Range],
        reverse: bool,
        odd: bool,
        even: bool,
    ) -> Result<Self> {
        let mut pages = Vec::new();

        for range in ranges {
            if range.is_blank() {
                pages.push(None);
                continue;
            }

            let start = absolute_page(range.start, total_pages);
            let end = absolute_page(range.end, total_pages);
            let step = if end < start { -1 } else { 1 };

            let mut current = start;
            loop {
                if current > total_pages as i64 {
                    return Err(ImposeError::Bounds(format!(
                        "page range {} is invalid",
                        range.text
                    )));
                }
                let is_even = current % 2 == 0;
                let excluded = (odd && !even && is_even) || (even && !odd && !is_even);
                if !excluded {
                    // Page 0 can only come from a range starting at 0; it
                    // selects nothing and is output blank
                    pages.push(usize::try_from(current - 1).ok());
                }
                if current == end {
                    break;
                }
                current += step;
            }
        }

        if reverse {
            pages.reverse();
        }

        Ok(Self { pages })
    }

    /// Select every page of the document in order
    pub fn all(total_pages: usize) -> Self {
        Self {
            pages: (0..total_pages).map(Some).collect(),
        }
    }

    /// Source page at position `index`, or `None` for a blank page or an
    /// index past the end of the list
    pub fn real_page(&self, index: usize) -> Option<usize> {
        self.pages.get(index).copied().flatten()
    }

    /// Number of entries, including blanks
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Option<usize>] {
        &self.pages
    }

    /// Output page count once padded up to a whole number of cycles
    pub fn padded_len(&self, modulo: usize) -> usize {
        let len = self.pages.len();
        len + (modulo - len % modulo) % modulo
    }
}
