//! Document Structuring Convention comments
//!
//! Only the handful of `%%` comments that delimit the header, prolog,
//! setup, pages and trailer are recognised; everything else is content
//! and is copied byte for byte.

mod scan;

pub use scan::*;

/// A recognised DSC comment keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DscComment {
    Page,
    Pages,
    BoundingBox,
    HiResBoundingBox,
    DocumentPaperSizes,
    DocumentMedia,
    EndComments,
    BeginProlog,
    EndSetup,
    BeginDocument,
    BeginBinary,
    BeginFile,
    EndDocument,
    EndBinary,
    EndFile,
    BeginProcSet,
    EndProcSet,
    Trailer,
    Eof,
    /// Any other `%%` keyword
    Other,
}

impl DscComment {
    /// Classify a line. Returns `None` if it is not a DSC comment at all.
    pub fn from_line(line: &[u8]) -> Option<Self> {
        comment_keyword(line).map(Self::from_keyword)
    }

    pub fn from_keyword(keyword: &[u8]) -> Self {
        match keyword {
            b"Page:" => DscComment::Page,
            b"Pages:" => DscComment::Pages,
            b"BoundingBox:" => DscComment::BoundingBox,
            b"HiResBoundingBox:" => DscComment::HiResBoundingBox,
            b"DocumentPaperSizes:" => DscComment::DocumentPaperSizes,
            b"DocumentMedia:" => DscComment::DocumentMedia,
            b"EndComments" => DscComment::EndComments,
            b"BeginProlog" => DscComment::BeginProlog,
            b"EndSetup" => DscComment::EndSetup,
            b"BeginDocument:" => DscComment::BeginDocument,
            b"BeginBinary:" => DscComment::BeginBinary,
            b"BeginFile:" => DscComment::BeginFile,
            b"EndDocument" => DscComment::EndDocument,
            b"EndBinary" => DscComment::EndBinary,
            b"EndFile" => DscComment::EndFile,
            b"BeginProcSet:" => DscComment::BeginProcSet,
            b"EndProcSet" => DscComment::EndProcSet,
            b"Trailer" => DscComment::Trailer,
            b"EOF" => DscComment::Eof,
            _ => DscComment::Other,
        }
    }

    /// Comments describing the paper size, replaced when the output size
    /// is set
    pub fn is_size_comment(self) -> bool {
        matches!(
            self,
            DscComment::BoundingBox
                | DscComment::HiResBoundingBox
                | DscComment::DocumentPaperSizes
                | DscComment::DocumentMedia
        )
    }

    /// Comments opening embedded content whose own comments must be ignored
    pub fn opens_nesting(self) -> bool {
        matches!(
            self,
            DscComment::BeginDocument | DscComment::BeginBinary | DscComment::BeginFile
        )
    }

    pub fn closes_nesting(self) -> bool {
        matches!(
            self,
            DscComment::EndDocument | DscComment::EndBinary | DscComment::EndFile
        )
    }
}

/// The keyword of a `%%` comment line: the non-blank run after `%%`
pub fn comment_keyword(line: &[u8]) -> Option<&[u8]> {
    let rest = line.strip_prefix(b"%%")?;
    let len = rest
        .iter()
        .position(|c| c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    if len == 0 { None } else { Some(&rest[..len]) }
}

/// True if `line` opens a procedure set written by this tool (any version)
pub fn is_own_procset_start(line: &[u8]) -> bool {
    let line = trim_eol(line);
    let Some(rest) = line.strip_prefix(b"%%BeginProcSet:") else {
        return false;
    };
    let rest = rest.trim_ascii_start();
    match rest.strip_prefix(crate::constants::PROCSET_NAME.as_bytes()) {
        Some(after) => after.is_empty() || after[0].is_ascii_whitespace(),
        None => false,
    }
}

/// Strip a trailing `\n` or `\r\n`
pub fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
