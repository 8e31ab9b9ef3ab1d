//! N-up layout calculation
//!
//! Finds the grid that best tiles N input pages onto an output page and
//! expresses it as a page specification the rearrangement engine can run.

mod grid;
mod types;

pub use grid::*;
pub use types::*;
