//! PDF backend
//!
//! Source pages are drawn onto new output pages as Form XObjects, so
//! the same transforms the PostScript backend writes as operators become
//! a `cm` matrix here.

use super::{PageTransform, format_fixed, resolve_placement};
use crate::options::TransformOptions;
use crate::pagelist::PageList;
use crate::spec::PageSpec;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::io::Write;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub struct PdfTransform<W> {
    source: Document,
    source_pages: Vec<ObjectId>,
    output: Document,
    writer: W,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    /// Source object id to output object id
    copied: HashMap<ObjectId, ObjectId>,
    /// Source page index to the Form XObject drawing it
    forms: HashMap<usize, ObjectId>,
    output_size: PageSize,
    input_size: PageSize,
    scale: f64,
    rotate: i32,
    draw: f64,
    global_transform: bool,
}

impl<W: Write> PdfTransform<W> {
    pub fn new(input: &[u8], writer: W, options: &TransformOptions) -> Result<Self> {
        let source = Document::load_mem(input)?;
        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        let input_size = match options.input_size {
            Some(size) => size,
            None => first_page_size(&source)?.ok_or(ImposeError::NoPages)?,
        };
        let output_size = options.output_size.unwrap_or(input_size);

        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();

        log::debug!(
            "loaded PDF with {} pages of {}x{}pt",
            source_pages.len(),
            input_size.width,
            input_size.height
        );

        Ok(Self {
            source,
            source_pages,
            output,
            writer,
            pages_tree_id,
            page_refs: Vec::new(),
            copied: HashMap::new(),
            forms: HashMap::new(),
            output_size,
            input_size,
            scale: options.scale,
            rotate: options.rotate.rem_euclid(360),
            draw: options.draw,
            global_transform: options.has_global_transform(),
        })
    }

    /// Add an unchanged copy of source page `page` to the output
    fn copy_page(&mut self, page: usize) -> Result<ObjectId> {
        let page_id = self.source_pages[page];
        let mut page_dict = Dictionary::new();
        for (key, value) in self.source.get_dictionary(page_id)?.iter() {
            if key.as_slice() != b"Parent" {
                page_dict.set(key.clone(), value.clone());
            }
        }
        for key in INHERITABLE {
            if !page_dict.has(key) {
                if let Some(value) = inherited_attribute(&self.source, page_id, key) {
                    page_dict.set(key, value);
                }
            }
        }

        let mut page_dict =
            copy_dictionary(&mut self.output, &self.source, &page_dict, &mut self.copied)?;
        page_dict.set("Parent", Object::Reference(self.pages_tree_id));
        Ok(self.output.add_object(page_dict))
    }

    /// The Form XObject for source page `page`, created on first use
    fn page_form(&mut self, page: usize) -> Result<ObjectId> {
        if let Some(&form_id) = self.forms.get(&page) {
            return Ok(form_id);
        }
        let form_id = create_page_xobject(
            &mut self.output,
            &self.source,
            self.source_pages[page],
            &mut self.copied,
        )?;
        self.forms.insert(page, form_id);
        Ok(form_id)
    }

    /// Placement matrix: flip, then rotate, then scale, then translate
    fn placement_matrix(&self, spec: &PageSpec) -> Matrix {
        let mut matrix = Matrix::IDENTITY;
        if spec.hflip {
            matrix = matrix.then(Matrix([-1.0, 0.0, 0.0, 1.0, self.input_size.width, 0.0]));
        } else if spec.vflip {
            matrix = matrix.then(Matrix([1.0, 0.0, 0.0, -1.0, 0.0, self.input_size.height]));
        }
        let rotate = (spec.rotate + self.rotate).rem_euclid(360);
        if rotate != 0 {
            matrix = matrix.then(Matrix::rotation(rotate as f64));
        }
        let scale = spec.scale * self.scale;
        if scale != 1.0 {
            matrix = matrix.then(Matrix([scale, 0.0, 0.0, scale, 0.0, 0.0]));
        }
        matrix.then(Matrix([1.0, 0.0, 0.0, 1.0, spec.xoff, spec.yoff]))
    }

    fn imposed_page(
        &mut self,
        page_list: &PageList,
        placements: &[PageSpec],
        maxpage: usize,
        modulo: usize,
        pagebase: usize,
    ) -> Result<ObjectId> {
        let page_count = self.source_pages.len();
        let (width, height) = (
            format_fixed(self.input_size.width),
            format_fixed(self.input_size.height),
        );
        let mut content = String::new();
        let mut xobjects = Dictionary::new();

        for (i, spec) in placements.iter().enumerate() {
            let Some(page) =
                resolve_placement(page_list, spec, maxpage, modulo, pagebase, page_count)
            else {
                continue;
            };
            let name = format!("P{i}");
            let form_id = self.page_form(page)?;
            xobjects.set(name.as_bytes(), Object::Reference(form_id));

            let matrix = self.placement_matrix(spec).to_operands();
            content.push_str(&format!(
                "q {matrix} cm 0 0 {width} {height} re W n /{name} Do Q\n"
            ));
            if self.draw > 0.0 {
                content.push_str(&format!(
                    "q {matrix} cm 0 G {} w 0 0 {width} {height} re S Q\n",
                    format_fixed(self.draw)
                ));
            }
        }

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_tree_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(self.output_size.width as f32),
                    Object::Real(self.output_size.height as f32),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        Ok(self.output.add_object(page_dict))
    }
}

impl<W: Write> PageTransform for PdfTransform<W> {
    fn page_count(&self) -> usize {
        self.source_pages.len()
    }

    fn input_size(&self) -> Option<PageSize> {
        Some(self.input_size)
    }

    fn write_header(&mut self, _maxpage: usize, _modulo: usize) -> Result<()> {
        Ok(())
    }

    fn write_page_label(&mut self, _label: &str, _output_page: usize) -> Result<()> {
        Ok(())
    }

    fn write_page(
        &mut self,
        page_list: &PageList,
        _output_page: usize,
        placements: &[PageSpec],
        maxpage: usize,
        modulo: usize,
        pagebase: usize,
    ) -> Result<()> {
        let page_count = self.page_count();
        let single_copy = match placements {
            [spec] if !self.global_transform && !spec.has_transform() && self.draw == 0.0 => {
                resolve_placement(page_list, spec, maxpage, modulo, pagebase, page_count)
            }
            _ => None,
        };

        let page_id = match single_copy {
            Some(page) => self.copy_page(page)?,
            None => self.imposed_page(page_list, placements, maxpage, modulo, pagebase)?,
        };
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(std::mem::take(&mut self.page_refs))),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        self.output.save_to(&mut self.writer)?;
        self.writer
            .flush()
            .map_err(|e| ImposeError::io("flushing output", e))
    }
}

// =============================================================================
// Matrices
// =============================================================================

/// Affine matrix `[a b c d e f]` in PDF's row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Anticlockwise rotation by `degrees`
    fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Matrix([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// Apply `self`, then `next`
    fn then(self, next: Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = next.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn to_operands(self) -> String {
        self.0
            .iter()
            .map(|value| format_fixed(clean_zero(*value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Flush rounding noise from rotations (and negative zero) to zero
fn clean_zero(value: f64) -> f64 {
    if value.abs() < 1e-9 { 0.0 } else { value }
}

// =============================================================================
// Source Pages
// =============================================================================

/// Size of the first page's MediaBox, or `None` for a document with no
/// pages
pub(crate) fn first_page_size(doc: &Document) -> Result<Option<PageSize>> {
    let Some(&page_id) = doc.get_pages().values().next() else {
        return Ok(None);
    };
    Ok(Some(page_dimensions(doc, page_id)?))
}

/// Width and height of a page's MediaBox in points
fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<PageSize> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .ok_or_else(|| ImposeError::Config("page has no MediaBox".to_string()))?;
    let corners: Vec<f64> = media_box
        .as_array()?
        .iter()
        .map(|obj| extract_number(doc, obj))
        .collect::<Option<_>>()
        .ok_or_else(|| ImposeError::Config("MediaBox is not numeric".to_string()))?;
    match corners.as_slice() {
        [llx, lly, urx, ury] => Ok(PageSize::new((urx - llx).abs(), (ury - lly).abs())),
        _ => Err(ImposeError::Config("MediaBox needs four numbers".to_string())),
    }
}

/// Look up `key` on a page, then on each ancestor in the page tree
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Bounded walk; a malformed tree may loop
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Numeric value of a PDF object, following one reference
fn extract_number(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        },
        _ => None,
    }
}

/// Create a Form XObject drawing a source page
fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let media_box = inherited_attribute(source, page_id, b"MediaBox").unwrap_or_else(|| {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ])
    });
    let content = page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", media_box);
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

/// Decoded content of a page, with multiple streams joined by newlines
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let stream_ids: Vec<ObjectId> = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(refs) => refs.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Ok(Object::Array(refs)) => refs.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => return Ok(Vec::new()),
    };

    let mut content = Vec::new();
    for id in stream_ids {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.extend_from_slice(&data);
            content.push(b'\n');
        }
    }
    Ok(content)
}

/// Deep copy an object from `source` into `output`, following references.
///
/// Each source object is copied once; its output id is reserved before
/// its children are visited so reference cycles terminate.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                Err(_) => Object::Null,
            };
            output.objects.insert(new_id, copied);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(items) => Ok(Object::Array(
            items
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect::<Result<_>>()?,
        )),
        Object::Stream(stream) => {
            let mut copied = Stream::new(
                copy_dictionary(output, source, &stream.dict, cache)?,
                stream.content.clone(),
            );
            copied.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copied))
        }
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut copied = Dictionary::new();
    for (key, value) in dict.iter() {
        copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(copied)
}
