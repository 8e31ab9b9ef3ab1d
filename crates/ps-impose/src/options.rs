use crate::constants::ALL_PAGES_RANGE;
use crate::pagelist::PageList;
use crate::spec::parse_ranges;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sizes and whole-document transforms applied while rearranging
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformOptions {
    /// Output page size; when set, the header's size comments are replaced
    pub output_size: Option<PageSize>,
    /// Input page size; defaults to the output size
    pub input_size: Option<PageSize>,
    /// Scale applied on top of every placement's own scale
    pub scale: f64,
    /// Rotation in degrees added to every transformed placement
    pub rotate: i32,
    /// Width of the line drawn around each page (points, 0 for none)
    pub draw: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            output_size: None,
            input_size: None,
            scale: 1.0,
            rotate: 0,
            draw: 0.0,
        }
    }
}

impl TransformOptions {
    /// True if every page is scaled or rotated regardless of its spec
    pub fn has_global_transform(&self) -> bool {
        self.scale != 1.0 || self.rotate.rem_euclid(360) != 0
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        load_json(path).await
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        save_json(self, path).await
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("output", self.output_size), ("input", self.input_size)] {
            if let Some(size) = size {
                if !(size.width > 0.0 && size.height > 0.0) {
                    return Err(ImposeError::Config(format!(
                        "{name} page size must be positive"
                    )));
                }
            }
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ImposeError::Config("scale must be positive".to_string()));
        }
        if !(self.draw.is_finite() && self.draw >= 0.0) {
            return Err(ImposeError::Config(
                "line width must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which input pages to output, and in what order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Selection {
    /// Page ranges such as `1-4,_,7`; every page when unset
    pub ranges: Option<String>,
    pub odd: bool,
    pub even: bool,
    pub reverse: bool,
}

impl Selection {
    pub fn with_ranges(ranges: impl Into<String>) -> Self {
        Self {
            ranges: Some(ranges.into()),
            ..Default::default()
        }
    }

    /// Resolve against a document of `total_pages` pages
    pub fn page_list(&self, total_pages: usize) -> Result<PageList> {
        let ranges = match &self.ranges {
            Some(text) => parse_ranges(text)?,
            None if total_pages == 0 => {
                log::warn!("document has no pages");
                return Ok(PageList::default());
            }
            None => parse_ranges(ALL_PAGES_RANGE)?,
        };
        PageList::new(total_pages, &ranges, self.reverse, self.odd, self.even)
    }
}

#[cfg(feature = "serde")]
pub(crate) async fn load_json<T: serde::de::DeserializeOwned>(
    path: impl AsRef<std::path::Path>,
) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))
}

#[cfg(feature = "serde")]
pub(crate) async fn save_json<T: serde::Serialize>(
    value: &T,
    path: impl AsRef<std::path::Path>,
) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
