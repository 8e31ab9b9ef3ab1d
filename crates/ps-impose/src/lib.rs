pub mod constants;
pub mod dsc;
pub mod impose;
pub mod layout;
mod options;
mod pagelist;
pub mod render;
pub mod spec;
mod types;

pub use impose::{
    page_label, read_input, rearrange, rearrange_bytes, rearrange_document, write_output,
};
pub use layout::{NupLayout, NupOptions, plan_nup};
pub use options::*;
pub use pagelist::*;
pub use render::{DocumentTransform, FileKind, PageTransform, PdfTransform, PsTransform, probe_input_size};
pub use spec::*;
pub use types::*;
