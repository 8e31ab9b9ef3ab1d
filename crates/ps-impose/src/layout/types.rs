//! Layout data types for N-up imposition

use crate::constants::DEFAULT_TOLERANCE;
use crate::spec::{SpecSet, parse_specs};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How to tile N input pages onto each output page
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NupOptions {
    /// Input pages per output page
    pub pages: usize,
    /// Space around the edge of the output page (points)
    pub margin: f64,
    /// Space around each input page (points)
    pub border: f64,
    /// Largest wasted area accepted, as the sum of squared leftovers
    pub tolerance: f64,
    /// Fill columns before rows
    pub column_major: bool,
    /// Input pages are rotated left (landscape seen from the right)
    pub rotated_left: bool,
    /// Input pages are rotated right
    pub rotated_right: bool,
    /// Swap the output page's width and height
    pub flip: bool,
}

impl Default for NupOptions {
    fn default() -> Self {
        Self {
            pages: 1,
            margin: 0.0,
            border: 0.0,
            tolerance: DEFAULT_TOLERANCE,
            column_major: false,
            rotated_left: false,
            rotated_right: false,
            flip: false,
        }
    }
}

impl NupOptions {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        crate::options::load_json(path).await
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        crate::options::save_json(self, path).await
    }

    pub fn validate(&self) -> Result<()> {
        if self.pages == 0 {
            return Err(ImposeError::Config(
                "number of pages per sheet must be positive".to_string(),
            ));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(ImposeError::Config("margin must not be negative".to_string()));
        }
        if !(self.border.is_finite() && self.border >= 0.0) {
            return Err(ImposeError::Config("border must not be negative".to_string()));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ImposeError::Config("tolerance must be positive".to_string()));
        }
        Ok(())
    }

    /// Order in which cells are filled, before accounting for a rotated
    /// layout
    pub fn cell_order(&self) -> CellOrder {
        let mut order = CellOrder {
            row_major: !self.column_major,
            left_right: true,
            top_bottom: true,
        };
        if self.rotated_left {
            order.row_major = !order.row_major;
            order.top_bottom = !order.top_bottom;
        }
        if self.rotated_right {
            order.row_major = !order.row_major;
            order.left_right = !order.left_right;
        }
        order
    }
}

/// Direction cells are filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOrder {
    /// Fill a whole row before moving to the next
    pub row_major: bool,
    /// Fill rows from the left
    pub left_right: bool,
    /// Fill columns from the top
    pub top_bottom: bool,
}

impl CellOrder {
    /// The order as seen on a page turned a quarter left
    pub fn rotated(self) -> Self {
        Self {
            row_major: !self.row_major,
            left_right: self.top_bottom,
            top_bottom: !self.left_right,
        }
    }

    /// Column and row (from the bottom left) of cell `index`
    pub fn cell(self, index: usize, columns: usize, rows: usize) -> (usize, usize) {
        let (mut across, mut up) = if self.row_major {
            (index % columns, index / columns)
        } else {
            (index / rows, index % rows)
        };
        if !self.left_right {
            across = columns - 1 - across;
        }
        if self.top_bottom {
            up = rows - 1 - up;
        }
        (across, up)
    }
}

/// The chosen tiling
#[derive(Debug, Clone, PartialEq)]
pub struct NupLayout {
    /// Cells across the output page
    pub columns: usize,
    /// Cells up the output page
    pub rows: usize,
    /// Input pages are turned a quarter left to fit
    pub rotated: bool,
    /// Scale applied to every input page
    pub scale: f64,
    /// Wasted area of the winning candidate
    pub waste: f64,
    /// Output page size, after any flip
    pub output_size: PageSize,
    /// Page specification placing every cell
    pub spec: String,
}

impl NupLayout {
    /// Parse the generated specification
    pub fn spec_set(&self) -> Result<SpecSet> {
        parse_specs(
            &self.spec,
            Some(self.output_size.width),
            Some(self.output_size.height),
        )
    }
}
