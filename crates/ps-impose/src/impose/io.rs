//! Document I/O for rearrangement
//!
//! Inputs are read whole into memory, which makes standard input
//! seekable like any file.

use crate::types::*;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Read a document from `path`, or from standard input when `None`
pub async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .map_err(|e| ImposeError::io(format!("opening input file {}", path.display()), e)),
        None => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| ImposeError::io("reading standard input", e))?;
            Ok(bytes)
        }
    }
}

/// Write a document to `path`, or to standard output when `None`
pub async fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .map_err(|e| ImposeError::io(format!("writing output file {}", path.display()), e)),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(bytes)
                .await
                .map_err(|e| ImposeError::io("writing standard output", e))?;
            stdout
                .flush()
                .await
                .map_err(|e| ImposeError::io("flushing standard output", e))
        }
    }
}
