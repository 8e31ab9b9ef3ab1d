//! Page rearrangement
//!
//! This module drives a backend through a whole document:
//! 1. Resolve the page selection against the document's page count
//! 2. Pad the page list to whole cycles of the specification's modulo
//! 3. Emit every output page of every cycle, then the trailer

mod io;

pub use io::{read_input, write_output};

use crate::options::{Selection, TransformOptions};
use crate::pagelist::PageList;
use crate::render::{DocumentTransform, PageTransform, resolve_placement};
use crate::spec::{PageSpec, SpecSet};
use crate::types::*;
use std::io::Write;

/// Rearrange the pages of `transform`'s document according to `specs`
pub fn rearrange<T: PageTransform + ?Sized>(
    transform: &mut T,
    specs: &SpecSet,
    selection: &Selection,
) -> Result<TransformStatistics> {
    let source_pages = transform.page_count();
    let page_list = selection.page_list(source_pages)?;
    let modulo = specs.modulo;
    let maxpage = page_list.padded_len(modulo);

    let mut stats = TransformStatistics {
        source_pages,
        selected_pages: page_list.len(),
        ..Default::default()
    };

    transform.write_header(maxpage, modulo)?;

    let mut output_page = 0;
    for pagebase in (0..maxpage).step_by(modulo) {
        for placements in &specs.pages {
            let label = page_label(&page_list, placements, maxpage, modulo, pagebase);
            output_page += 1;
            transform.write_page_label(&label, output_page)?;
            log::info!("[{label}]");

            stats.blank_placements += placements
                .iter()
                .filter(|spec| {
                    resolve_placement(&page_list, spec, maxpage, modulo, pagebase, source_pages)
                        .is_none()
                })
                .count();
            transform.write_page(&page_list, output_page, placements, maxpage, modulo, pagebase)?;
        }
    }

    transform.finalize()?;
    stats.output_pages = output_page;
    log::info!("Wrote {output_page} pages");
    Ok(stats)
}

/// Label of an output page: the 1-based input page numbers drawn on it,
/// `*` for blanks, joined by commas
pub fn page_label(
    page_list: &PageList,
    placements: &[PageSpec],
    maxpage: usize,
    modulo: usize,
    pagebase: usize,
) -> String {
    placements
        .iter()
        .map(|spec| match page_list.real_page(spec.page_index(maxpage, modulo, pagebase)) {
            Some(page) => (page + 1).to_string(),
            None => "*".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Rearrange an in-memory document, writing the result to `output`
pub fn rearrange_document<W: Write>(
    input: Vec<u8>,
    output: W,
    specs: &SpecSet,
    options: &TransformOptions,
    selection: &Selection,
) -> Result<TransformStatistics> {
    options.validate()?;
    let mut transform = DocumentTransform::open(input, output, options, specs)?;
    log::debug!(
        "rearranging {:?} document of {} pages",
        transform.kind(),
        transform.page_count()
    );
    rearrange(&mut transform, specs, selection)
}

/// Rearrange an in-memory document on the blocking thread pool
pub async fn rearrange_bytes(
    input: Vec<u8>,
    specs: SpecSet,
    options: TransformOptions,
    selection: Selection,
) -> Result<(Vec<u8>, TransformStatistics)> {
    tokio::task::spawn_blocking(move || {
        let mut output = Vec::new();
        let stats = rearrange_document(input, &mut output, &specs, &options, &selection)?;
        Ok::<_, ImposeError>((output, stats))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Range, parse_specs};

    #[test]
    fn test_page_label_marks_blanks() {
        let ranges = [Range::new(1, 3, "1-3")];
        let page_list = PageList::new(3, &ranges, false, false, false).unwrap();
        let specs = parse_specs("2:0+1", None, None).unwrap();
        let maxpage = page_list.padded_len(specs.modulo);
        assert_eq!(maxpage, 4);

        assert_eq!(page_label(&page_list, &specs.pages[0], maxpage, 2, 0), "1,2");
        assert_eq!(page_label(&page_list, &specs.pages[0], maxpage, 2, 2), "3,*");
    }

    #[test]
    fn test_reversed_label() {
        let page_list = PageList::all(4);
        let specs = parse_specs("2:-1+0", None, None).unwrap();
        assert_eq!(page_label(&page_list, &specs.pages[0], 4, 2, 0), "4,1");
    }
}
