//! Output backends for page rearrangement
//!
//! Both backends implement [`PageTransform`]; [`DocumentTransform`]
//! picks one by looking at the first bytes of the input.

mod pdf;
mod postscript;

pub use pdf::PdfTransform;
pub use postscript::PsTransform;

use crate::options::TransformOptions;
use crate::pagelist::PageList;
use crate::spec::{PageSpec, SpecSet};
use crate::types::*;
use std::io::{Cursor, Write};

/// Operations the rearrangement driver needs from a backend.
///
/// Calls arrive in a fixed order: `write_header` once, then a
/// `write_page_label`/`write_page` pair per output page, then `finalize`.
pub trait PageTransform {
    /// Pages in the input document
    fn page_count(&self) -> usize;

    /// Size of the input pages, if known
    fn input_size(&self) -> Option<PageSize>;

    fn write_header(&mut self, maxpage: usize, modulo: usize) -> Result<()>;

    /// Announce output page `output_page` (1-based) with its label
    fn write_page_label(&mut self, label: &str, output_page: usize) -> Result<()>;

    /// Draw every placement of one output page
    fn write_page(
        &mut self,
        page_list: &PageList,
        output_page: usize,
        placements: &[PageSpec],
        maxpage: usize,
        modulo: usize,
        pagebase: usize,
    ) -> Result<()>;

    /// Copy anything left in the input and flush the output
    fn finalize(&mut self) -> Result<()>;
}

/// The source page a placement draws in the cycle at `pagebase`, or
/// `None` if it falls on a blank or outside the document
pub fn resolve_placement(
    page_list: &PageList,
    spec: &PageSpec,
    maxpage: usize,
    modulo: usize,
    pagebase: usize,
    page_count: usize,
) -> Option<usize> {
    page_list
        .real_page(spec.page_index(maxpage, modulo, pagebase))
        .filter(|&page| page < page_count)
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Input formats recognised by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    PostScript,
    Pdf,
}

impl FileKind {
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%!") {
            Some(FileKind::PostScript)
        } else if data.starts_with(b"%PDF") {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

/// A backend chosen for an in-memory input document
pub enum DocumentTransform<W: Write> {
    PostScript(PsTransform<Cursor<Vec<u8>>, W>),
    Pdf(PdfTransform<W>),
}

impl<W: Write> DocumentTransform<W> {
    /// Open the backend matching the content of `input`
    pub fn open(
        input: Vec<u8>,
        output: W,
        options: &TransformOptions,
        specs: &SpecSet,
    ) -> Result<Self> {
        match FileKind::sniff(&input) {
            Some(FileKind::PostScript) => Ok(DocumentTransform::PostScript(PsTransform::new(
                Cursor::new(input),
                output,
                options,
                specs,
            )?)),
            Some(FileKind::Pdf) => Ok(DocumentTransform::Pdf(PdfTransform::new(
                &input, output, options,
            )?)),
            None => Err(ImposeError::Config("incompatible file type".to_string())),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            DocumentTransform::PostScript(_) => FileKind::PostScript,
            DocumentTransform::Pdf(_) => FileKind::Pdf,
        }
    }

    fn backend(&mut self) -> &mut dyn PageTransform {
        match self {
            DocumentTransform::PostScript(transform) => transform,
            DocumentTransform::Pdf(transform) => transform,
        }
    }
}

impl<W: Write> PageTransform for DocumentTransform<W> {
    fn page_count(&self) -> usize {
        match self {
            DocumentTransform::PostScript(transform) => transform.page_count(),
            DocumentTransform::Pdf(transform) => transform.page_count(),
        }
    }

    fn input_size(&self) -> Option<PageSize> {
        match self {
            DocumentTransform::PostScript(transform) => transform.input_size(),
            DocumentTransform::Pdf(transform) => transform.input_size(),
        }
    }

    fn write_header(&mut self, maxpage: usize, modulo: usize) -> Result<()> {
        self.backend().write_header(maxpage, modulo)
    }

    fn write_page_label(&mut self, label: &str, output_page: usize) -> Result<()> {
        self.backend().write_page_label(label, output_page)
    }

    fn write_page(
        &mut self,
        page_list: &PageList,
        output_page: usize,
        placements: &[PageSpec],
        maxpage: usize,
        modulo: usize,
        pagebase: usize,
    ) -> Result<()> {
        self.backend()
            .write_page(page_list, output_page, placements, maxpage, modulo, pagebase)
    }

    fn finalize(&mut self) -> Result<()> {
        self.backend().finalize()
    }
}

/// Page size of a document without opening a full backend.
///
/// Only PDF input carries a size the backend can read; PostScript input
/// yields `None`.
pub fn probe_input_size(input: &[u8]) -> Result<Option<PageSize>> {
    match FileKind::sniff(input) {
        Some(FileKind::Pdf) => pdf::first_page_size(&lopdf::Document::load_mem(input)?),
        Some(FileKind::PostScript) => Ok(None),
        None => Err(ImposeError::Config("incompatible file type".to_string())),
    }
}

// =============================================================================
// Number Formatting
// =============================================================================

/// Fixed notation with six decimals, as `%f`
pub fn format_fixed(value: f64) -> String {
    format!("{value:.6}")
}

/// Six significant digits with trailing zeros removed, switching to
/// exponent notation for very large or small values, as `%g`
pub fn format_general(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value == 0.0 { "0".to_string() } else { value.to_string() };
    }

    let scientific = format!("{value:.5e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (5 - exponent) as usize;
        strip_fraction_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
