//! Grid layout search
//!
//! Tries every way of splitting N into columns × rows, with the input
//! pages upright and turned a quarter, and keeps the one leaving the
//! least unused space on the output page.

use super::{NupLayout, NupOptions};
use crate::render::format_fixed;
use crate::types::*;

// =============================================================================
// Divisor Search
// =============================================================================

/// The next divisor of `total` larger than `n`, paired with its
/// cofactor, or `None` once `n` reaches `total`
pub fn next_divisor(n: usize, total: usize) -> Option<(usize, usize)> {
    ((n + 1)..=total)
        .find(|d| total % d == 0)
        .map(|d| (d, total / d))
}

/// A columns × rows split under evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    columns: usize,
    rows: usize,
    rotated: bool,
    waste: f64,
}

/// Sum of the squared unused width and height when `columns` × `rows`
/// cells of `cell_width` × `cell_height` are scaled to fit
fn waste(
    columns: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    usable: PageSize,
) -> f64 {
    let scale = (usable.height / (cell_height * rows as f64))
        .min(usable.width / (cell_width * columns as f64));
    (usable.width - scale * cell_width * columns as f64).powi(2)
        + (usable.height - scale * cell_height * rows as f64).powi(2)
}

fn best_candidate(pages: usize, input: PageSize, usable: PageSize, tolerance: f64) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut consider = |candidate: Candidate| {
        let limit = best.map_or(tolerance, |b| b.waste);
        if candidate.waste < limit {
            best = Some(candidate);
        }
    };

    let mut split = Some((1, pages));
    while let Some((across, up)) = split {
        consider(Candidate {
            columns: across,
            rows: up,
            rotated: false,
            waste: waste(across, up, input.width, input.height, usable),
        });
        consider(Candidate {
            columns: up,
            rows: across,
            rotated: true,
            waste: waste(up, across, input.height, input.width, usable),
        });
        split = next_divisor(across, pages);
    }
    best
}

// =============================================================================
// Layout
// =============================================================================

/// Choose how to tile `options.pages` pages of `input_size` onto pages
/// of `output_size`
pub fn plan_nup(options: &NupOptions, output_size: PageSize, input_size: PageSize) -> Result<NupLayout> {
    options.validate()?;
    let output_size = if options.flip {
        output_size.flipped()
    } else {
        output_size
    };

    let margin = options.margin;
    let border = options.border;
    let usable = PageSize::new(
        output_size.width - margin * 2.0,
        output_size.height - margin * 2.0,
    );
    if usable.width <= 0.0 || usable.height <= 0.0 {
        return Err(ImposeError::Bounds("margin is too large".to_string()));
    }
    if border > usable.width.min(usable.height) {
        return Err(ImposeError::Bounds("border is too large".to_string()));
    }

    let best = best_candidate(options.pages, input_size, usable, options.tolerance).ok_or_else(
        || {
            ImposeError::Bounds(format!(
                "can't find acceptable layout for {}-up",
                options.pages
            ))
        },
    )?;

    let mut order = options.cell_order();
    let mut page = input_size;
    if best.rotated {
        order = order.rotated();
        page = page.flipped();
    }

    let (columns, rows) = (best.columns as f64, best.rows as f64);
    let scale = ((usable.height - 2.0 * border * rows) / (page.height * rows))
        .min((usable.width - 2.0 * border * columns) / (page.width * columns));
    if scale.is_nan() || scale <= 0.0 {
        return Err(ImposeError::Bounds("border is too large".to_string()));
    }

    let cell_width = usable.width / columns;
    let cell_height = usable.height / rows;
    let hshift = (cell_width - page.width * scale) / 2.0;
    let vshift = (cell_height - page.height * scale) / 2.0;

    let placements: Vec<String> = (0..options.pages)
        .map(|index| {
            let (across, up) = order.cell(index, best.columns, best.rows);
            let xoff = if best.rotated {
                margin + (across + 1) as f64 * cell_width - hshift
            } else {
                margin + across as f64 * cell_width + hshift
            };
            let yoff = margin + up as f64 * cell_height + vshift;
            format!(
                "{index}{}@{}({},{})",
                if best.rotated { "L" } else { "" },
                format_fixed(scale),
                format_fixed(xoff),
                format_fixed(yoff)
            )
        })
        .collect();

    let spec = format!("{}:{}", options.pages, placements.join("+"));
    log::info!(
        "{}-up as {}x{}{} at scale {:.4}",
        options.pages,
        best.columns,
        best.rows,
        if best.rotated { " rotated" } else { "" },
        scale
    );

    Ok(NupLayout {
        columns: best.columns,
        rows: best.rows,
        rotated: best.rotated,
        scale,
        waste: best.waste,
        output_size,
        spec,
    })
}

// =============================================================================
// Tests
// =============================================================================
