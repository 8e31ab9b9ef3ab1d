//! DSC PostScript backend
//!
//! The input is never interpreted. Header, prolog, setup and page bodies
//! are copied byte for byte between the offsets found by the scanner;
//! imposition is done by wrapping each page body in a save/restore pair
//! and a coordinate transform.

use super::{PageTransform, format_fixed, format_general, resolve_placement};
use crate::constants::{PROCSET, PROCSET_NAME, PROCSET_VERSION, SAVE_XFORM, XFORM_LINE_PREFIX};
use crate::dsc::{DocumentIndex, DscComment, scan};
use crate::options::TransformOptions;
use crate::pagelist::PageList;
use crate::spec::{PageSpec, SpecSet};
use crate::types::*;
use std::io::{BufRead, Read, Seek, SeekFrom, Write};

pub struct PsTransform<R, W> {
    input: R,
    output: W,
    index: DocumentIndex,
    output_size: Option<PageSize>,
    input_size: Option<PageSize>,
    scale: f64,
    /// Global rotation in degrees, within 0..360
    rotate: i32,
    draw: f64,
    global_transform: bool,
    use_procset: bool,
    pages_per_cycle: usize,
}

impl<R: BufRead + Seek, W: Write> PsTransform<R, W> {
    /// Scan `input` and prepare to write the rearranged document to
    /// `output`
    pub fn new(mut input: R, output: W, options: &TransformOptions, specs: &SpecSet) -> Result<Self> {
        let index = scan(&mut input, options.output_size.is_some())?;

        let input_size = options.input_size.or(options.output_size);
        if specs.flipping && input_size.is_none() {
            return Err(ImposeError::Config(
                "input page size must be set when flipping the page".to_string(),
            ));
        }

        let global_transform = options.has_global_transform();
        let use_procset = global_transform || specs.any_transform();

        Ok(Self {
            input,
            output,
            index,
            output_size: options.output_size,
            input_size,
            scale: options.scale,
            rotate: options.rotate.rem_euclid(360),
            draw: options.draw,
            global_transform,
            use_procset,
            pages_per_cycle: specs.pages_per_cycle(),
        })
    }

    /// Whether the output carries the imposition procedure set
    pub fn uses_procset(&self) -> bool {
        self.use_procset
    }

    /// Give back the output stream
    pub fn into_output(self) -> W {
        self.output
    }

    // ===== Stream helpers =====

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").map_err(|e| ImposeError::io("writing output", e))
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        self.input
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| ImposeError::io(format!("seeking to offset {offset}"), e))
    }

    fn position(&mut self) -> Result<u64> {
        self.input
            .stream_position()
            .map_err(|e| ImposeError::io("reading input position", e))
    }

    fn read_line(&mut self, line: &mut Vec<u8>) -> Result<usize> {
        line.clear();
        self.input
            .read_until(b'\n', line)
            .map_err(|e| ImposeError::io("reading input", e))
    }

    fn copy_bytes(&mut self, count: u64) -> Result<()> {
        let copied = std::io::copy(&mut (&mut self.input).take(count), &mut self.output)
            .map_err(|e| ImposeError::io("copying input", e))?;
        if copied < count {
            log::warn!("input ended {} bytes early", count - copied);
        }
        Ok(())
    }

    /// Copy from the current position up to `upto`, dropping each whole
    /// line that starts at one of the sorted `exclusions`
    fn copy_until(&mut self, upto: u64, exclusions: &[u64]) -> Result<()> {
        let mut here = self.position()?;
        let mut scratch = Vec::new();
        for &skip in exclusions {
            if skip >= upto {
                break;
            }
            if skip < here {
                continue;
            }
            self.copy_bytes(skip - here)?;
            self.read_line(&mut scratch)?;
            here = self.position()?;
        }
        if upto > here {
            self.copy_bytes(upto - here)?;
        }
        Ok(())
    }

    fn size_comments(&self) -> Vec<u64> {
        self.index.size_comments.clone()
    }

    // ===== Page parts =====

    /// Position the input at page `page`, checking the marker is there
    fn seek_page(&mut self, page: usize) -> Result<()> {
        let offset = self.index.page_offsets[page];
        self.seek(offset)?;
        let mut line = Vec::new();
        self.read_line(&mut line)?;
        if DscComment::from_line(&line) != Some(DscComment::Page) {
            return Err(ImposeError::Bounds(format!(
                "page {} does not start with a %%Page: comment",
                page + 1
            )));
        }
        Ok(())
    }

    fn write_placement_transform(&mut self, spec: &PageSpec) -> Result<()> {
        let scale = spec.scale * self.scale;
        let rotate = (spec.rotate + self.rotate).rem_euclid(360);

        self.write_line("PStoPSmatrix setmatrix")?;
        self.write_line(&format!(
            "{} {} translate",
            format_fixed(spec.xoff),
            format_fixed(spec.yoff)
        ))?;
        if rotate != 0 {
            self.write_line(&format!("{rotate} rotate"))?;
        }
        if let Some(size) = self.input_size {
            if spec.hflip {
                self.write_line(&format!(
                    "[ -1 0 0 1 {} 0 ] concat",
                    format_general(size.width * scale)
                ))?;
            }
            if spec.vflip {
                self.write_line(&format!(
                    "[ 1 0 0 -1 0 {} ] concat",
                    format_general(size.height * scale)
                ))?;
            }
        }
        if scale != 1.0 {
            self.write_line(&format!("{} dup scale", format_fixed(scale)))?;
        }
        self.write_line("userdict/PStoPSmatrix matrix currentmatrix put")?;

        if let Some(size) = self.input_size {
            self.write_line(&format!(
                "userdict/PStoPSclip{{0 0 moveto\n {} 0 rlineto 0 {} rlineto {} 0 rlineto\n closepath}}put initclip",
                format_fixed(size.width),
                format_fixed(size.height),
                format_fixed(-size.width)
            ))?;
            if self.draw > 0.0 {
                self.write_line(&format!(
                    "gsave clippath 0 setgray {} setlinewidth stroke grestore",
                    format_general(self.draw)
                ))?;
            }
        }
        Ok(())
    }

    /// Copy the page setup an earlier imposition run put before its
    /// `PStoPSxform` line
    fn replay_page_setup(&mut self, page: usize, output_page: usize) -> Result<()> {
        let boundary = self.index.page_offsets[page + 1];
        let mut line = Vec::new();
        loop {
            if self.position()? >= boundary {
                log::warn!("no page setup end found for output page {output_page}");
                break;
            }
            line.clear();
            let read = self
                .input
                .read_until(b'\n', &mut line)
                .map_err(|e| ImposeError::io(format!("reading page setup {output_page}"), e))?;
            if read == 0 || line.starts_with(XFORM_LINE_PREFIX) {
                break;
            }
            self.output.write_all(&line).map_err(|e| {
                ImposeError::io(format!("writing page setup {output_page}"), e)
            })?;
        }
        Ok(())
    }
}

impl<R: BufRead + Seek, W: Write> PageTransform for PsTransform<R, W> {
    fn page_count(&self) -> usize {
        self.index.page_count()
    }

    fn input_size(&self) -> Option<PageSize> {
        self.input_size
    }

    fn write_header(&mut self, maxpage: usize, modulo: usize) -> Result<()> {
        self.seek(0)?;
        let size_comments = self.size_comments();

        if let Some(pages_comment) = self.index.pages_comment {
            self.copy_until(pages_comment, &size_comments)?;
            let mut skipped = Vec::new();
            self.read_line(&mut skipped)?;
            if let Some(size) = self.output_size {
                let (width, height) = (size.width as i64, size.height as i64);
                self.write_line(&format!("%%DocumentMedia: plain {width} {height} 0 () ()"))?;
                self.write_line(&format!("%%BoundingBox: 0 0 {width} {height}"))?;
            }
            self.write_line(&format!(
                "%%Pages: {} 0",
                maxpage / modulo * self.pages_per_cycle
            ))?;
        }
        self.copy_until(self.index.header_end, &size_comments)?;

        if self.use_procset {
            self.write_line(&format!(
                "%%BeginProcSet: {PROCSET_NAME} {PROCSET_VERSION}\n{PROCSET}"
            ))?;
            self.write_line("%%EndProcSet")?;
        }

        // Replace the procedure set of an earlier run with ours
        if let (Some(start), Some(end)) = (self.index.procset_start, self.index.procset_end) {
            if self.use_procset {
                self.copy_until(start, &[])?;
                self.seek(end)?;
            }
        }
        self.copy_until(self.index.end_setup, &[])?;

        if self.index.procset_start.is_none() && self.use_procset {
            self.write_line(SAVE_XFORM)?;
        }

        self.copy_until(self.index.first_page(), &[])
    }

    fn write_page_label(&mut self, label: &str, output_page: usize) -> Result<()> {
        self.write_line(&format!("%%Page: ({label}) {output_page}"))
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
        let page_count = self.page_count();

        for (i, spec) in placements.iter().enumerate() {
            let source = resolve_placement(page_list, spec, maxpage, modulo, pagebase, page_count);
            if let Some(page) = source {
                self.seek_page(page)?;
            }

            if self.use_procset {
                self.write_line("userdict/PStoPSsaved save put")?;
            }
            if self.global_transform || spec.has_transform() {
                self.write_placement_transform(spec)?;
            }
            if i + 1 < placements.len() {
                self.write_line("/PStoPSenablepage false def")?;
            }

            let imposed_before = self.index.procset_start.is_some();
            if let (true, Some(page)) = (imposed_before, source) {
                self.replay_page_setup(page, output_page)?;
            }
            if !imposed_before && self.use_procset {
                self.write_line("PStoPSxform concat")?;
            }

            match source {
                Some(page) => {
                    let end = self.index.page_offsets[page + 1];
                    self.copy_until(end, &[])?;
                }
                None => self.write_line("showpage")?,
            }

            if self.use_procset {
                self.write_line("PStoPSsaved restore")?;
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.seek(self.index.trailer())?;
        std::io::copy(&mut self.input, &mut self.output)
            .map_err(|e| ImposeError::io("writing trailer", e))?;
        self.output
            .flush()
            .map_err(|e| ImposeError::io("flushing output", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_specs;
    use std::io::Cursor;

    const DOC: &str = "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 595 842\n%%Pages: 2\n%%EndComments\n\
                       %%BeginSetup\n%%EndSetup\n%%Page: 1 1\n(one) show showpage\n\
                       %%Page: 2 2\n(two) show showpage\n%%Trailer\n%%EOF\n";

    fn transform(specs: &str, options: &TransformOptions) -> PsTransform<Cursor<&'static str>, Vec<u8>> {
        let specs = parse_specs(specs, None, None).unwrap();
        PsTransform::new(Cursor::new(DOC), Vec::new(), options, &specs).unwrap()
    }

    #[test]
    fn test_identity_skips_procset() {
        let transform = transform("0", &TransformOptions::default());
        assert!(!transform.uses_procset());
        assert_eq!(transform.page_count(), 2);
    }

    #[test]
    fn test_copy_until_drops_excluded_lines() {
        let mut transform = transform("0", &TransformOptions::default());
        let bbox = DOC.find("%%BoundingBox").unwrap() as u64;
        let pages = DOC.find("%%Pages").unwrap() as u64;
        transform.seek(0).unwrap();
        transform.copy_until(pages, &[bbox]).unwrap();
        assert_eq!(transform.into_output(), b"%!PS-Adobe-3.0\n");
    }

    #[test]
    fn test_copy_until_behind_position_is_noop() {
        let mut transform = transform("0", &TransformOptions::default());
        transform.seek(20).unwrap();
        transform.copy_until(10, &[]).unwrap();
        assert!(transform.into_output().is_empty());
    }

    #[test]
    fn test_flip_needs_input_size() {
        let specs = parse_specs("0H", None, None).unwrap();
        let result = PsTransform::new(
            Cursor::new(DOC),
            Vec::new(),
            &TransformOptions::default(),
            &specs,
        );
        match result {
            Err(ImposeError::Config(msg)) => assert!(msg.contains("flipping")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_global_scale_uses_procset() {
        let options = TransformOptions {
            scale: 0.5,
            ..Default::default()
        };
        assert!(transform("0", &options).uses_procset());
    }
}
