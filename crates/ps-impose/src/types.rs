use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("{0}")]
    Spec(String),
    #[error("`{0}' is not a page range")]
    Range(String),
    #[error("{0}")]
    Dimension(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Bounds(String),
    #[error("I/O error {context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to impose")]
    NoPages,
}

impl ImposeError {
    /// Attach the failing operation to an I/O error
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ImposeError::IoContext {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// Malformed user input (specifications, ranges, dimensions, missing
    /// paper sizes) exits with 1; structural, bounds and I/O failures with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImposeError::Spec(_)
            | ImposeError::Range(_)
            | ImposeError::Dimension(_)
            | ImposeError::Config(_) => 1,
            ImposeError::Bounds(_)
            | ImposeError::IoContext { .. }
            | ImposeError::Io(_)
            | ImposeError::Pdf(_)
            | ImposeError::TaskJoin(_)
            | ImposeError::NoPages => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Page or sheet dimensions in PostScript points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Swap width and height
    pub fn flipped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    B5,
    Letter,
    Legal,
    Executive,
    Tabloid,
    Ledger,
}

impl PaperSize {
    pub const ALL: [PaperSize; 9] = [
        PaperSize::A3,
        PaperSize::A4,
        PaperSize::A5,
        PaperSize::B5,
        PaperSize::Letter,
        PaperSize::Legal,
        PaperSize::Executive,
        PaperSize::Tabloid,
        PaperSize::Ledger,
    ];

    /// Dimensions in whole points, portrait except for ledger
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            PaperSize::A3 => (842.0, 1191.0),
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::A5 => (420.0, 595.0),
            PaperSize::B5 => (499.0, 709.0),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
            PaperSize::Executive => (522.0, 756.0),
            PaperSize::Tabloid => (792.0, 1224.0),
            PaperSize::Ledger => (1224.0, 792.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperSize::A3 => "a3",
            PaperSize::A4 => "a4",
            PaperSize::A5 => "a5",
            PaperSize::B5 => "b5",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
            PaperSize::Executive => "executive",
            PaperSize::Tabloid => "tabloid",
            PaperSize::Ledger => "ledger",
        }
    }

    /// Look up a paper by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|paper| paper.name().eq_ignore_ascii_case(name))
    }

    pub fn size(self) -> PageSize {
        let (width, height) = self.dimensions_pt();
        PageSize::new(width, height)
    }

    /// The configured default paper.
    ///
    /// Checks `PAPERSIZE`, then the first non-comment line of
    /// `/etc/papersize`.
    pub fn system_default() -> Option<Self> {
        if let Ok(name) = std::env::var("PAPERSIZE") {
            if let Some(paper) = Self::from_name(&name) {
                return Some(paper);
            }
        }
        let contents = std::fs::read_to_string("/etc/papersize").ok()?;
        contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .and_then(Self::from_name)
    }
}

/// Summary of a finished rearrangement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformStatistics {
    /// Pages found in the input document
    pub source_pages: usize,
    /// Entries in the resolved page list (including inserted blanks)
    pub selected_pages: usize,
    /// Output pages written
    pub output_pages: usize,
    /// Placements that had no source page and were left blank
    pub blank_placements: usize,
}
