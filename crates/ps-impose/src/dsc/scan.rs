//! Single forward pass indexing a DSC document's regions and pages

use super::{DscComment, is_own_procset_start};
use crate::types::*;
use std::io::{BufRead, Seek, SeekFrom};

/// Byte offsets of the regions of a DSC document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentIndex {
    /// Start of each `%%Page:` line, followed by the start of the trailer
    /// (or end of file). Always holds page count + 1 entries.
    pub page_offsets: Vec<u64>,
    /// End of the header comments (or 0 if none were found)
    pub header_end: u64,
    /// Start of the header `%%Pages:` line
    pub pages_comment: Option<u64>,
    /// Starts of header paper-size comments to drop on rewrite
    pub size_comments: Vec<u64>,
    /// Start of the `%%EndSetup` line, never past the first page
    pub end_setup: u64,
    /// Start of a procedure set written by an earlier run
    pub procset_start: Option<u64>,
    /// End of that procedure set (after its `%%EndProcSet` line)
    pub procset_end: Option<u64>,
}

impl DocumentIndex {
    pub fn page_count(&self) -> usize {
        self.page_offsets.len().saturating_sub(1)
    }

    /// Offset of the first page, or of the trailer if there are no pages
    pub fn first_page(&self) -> u64 {
        self.page_offsets.first().copied().unwrap_or(0)
    }

    /// Offset where the trailer starts
    pub fn trailer(&self) -> u64 {
        self.page_offsets.last().copied().unwrap_or(0)
    }
}

/// Index `input` without interpreting any PostScript.
///
/// Paper-size comments in the header are only recorded when
/// `exclude_size_comments` is set, i.e. when the caller will write its
/// own size comments in their place.
pub fn scan<R: BufRead + Seek>(input: &mut R, exclude_size_comments: bool) -> Result<DocumentIndex> {
    input
        .seek(SeekFrom::Start(0))
        .map_err(|e| ImposeError::io("seeking to start of document", e))?;

    let mut index = DocumentIndex::default();
    let mut header_end: Option<u64> = None;
    let mut end_setup: Option<u64> = None;
    let mut nesting = 0usize;
    let mut offset = 0u64;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = input
            .read_until(b'\n', &mut line)
            .map_err(|e| ImposeError::io("scanning document", e))?;
        if read == 0 {
            break;
        }
        let record = offset;
        let next_record = offset + read as u64;

        match DscComment::from_line(&line) {
            Some(comment) => {
                let in_header = header_end.is_none();
                if nesting == 0 && comment == DscComment::Page {
                    // A page always ends the header
                    header_end.get_or_insert(record);
                    index.page_offsets.push(record);
                } else if in_header && exclude_size_comments && comment.is_size_comment() {
                    index.size_comments.push(record);
                } else if in_header && comment == DscComment::Pages {
                    index.pages_comment = Some(record);
                } else if in_header && comment == DscComment::EndComments {
                    header_end = Some(next_record);
                } else if comment.opens_nesting() {
                    nesting += 1;
                } else if comment.closes_nesting() {
                    nesting = nesting.saturating_sub(1);
                } else if nesting == 0 && comment == DscComment::EndSetup {
                    end_setup = Some(record);
                } else if nesting == 0 && in_header && comment == DscComment::BeginProlog {
                    header_end = Some(next_record);
                } else if nesting == 0
                    && comment == DscComment::BeginProcSet
                    && index.procset_start.is_none()
                    && is_own_procset_start(&line)
                {
                    index.procset_start = Some(record);
                } else if index.procset_start.is_some()
                    && index.procset_end.is_none()
                    && comment == DscComment::EndProcSet
                {
                    index.procset_end = Some(next_record);
                } else if nesting == 0
                    && matches!(comment, DscComment::Trailer | DscComment::Eof)
                {
                    break;
                }
            }
            None => {
                // Content before any end-of-header marker means there is no
                // header. The first line is the `%!` magic line.
                if header_end.is_none() && record > 0 && !line.starts_with(b"%%") {
                    header_end = Some(record);
                }
            }
        }

        offset = next_record;
    }

    index.page_offsets.push(offset);

    let first_page = index.first_page();
    index.header_end = header_end.map_or(0, |end| end.min(first_page));
    index.end_setup = match end_setup {
        Some(end) if end <= first_page => end,
        _ => first_page,
    };

    log::debug!(
        "scanned {} pages; header ends at {}, setup ends at {}, first page at {}",
        index.page_count(),
        index.header_end,
        index.end_setup,
        first_page
    );

    Ok(index)
}
