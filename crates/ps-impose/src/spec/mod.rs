//! Text grammars accepted from the command line
//!
//! - Dimensions with units (`21cm`, `1in`, `0.5w`)
//! - Page specifications (`2:0L@.7(21cm,0)+1L@.7(21cm,14.85cm)`)
//! - Page ranges (`1-4,_,_3-_1`)

mod dimension;
mod pagespec;
mod range;

pub use dimension::*;
pub use pagespec::*;
pub use range::*;
