//! Writers and loaders for generated graphs.
//!
//! Three formats are supported: a plain `u v` edge list, a JSON document with
//! popularity and adjacency, and a compact binary CSR layout.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

pub mod csr;
pub mod json;
pub mod text;

/// Errors raised while writing or reading graph files.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphIoError {
    /// Underlying file or stream failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// Edge-list encoding or decoding failure.
    #[error("edge list error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// An edge-list record did not hold two node ids.
    #[error("edge record {record} is invalid: {reason}")]
    InvalidEdgeRecord {
        /// One-based record number.
        record: u64,
        reason: String,
    },
    /// An edge-list record joined a node to itself.
    #[error("edge record {record} is a self-loop on node {node}")]
    SelfLoop {
        /// One-based record number.
        record: u64,
        node: u32,
    },
    /// A value does not fit the signed 32-bit CSR fields.
    #[error("{what} = {value} does not fit a signed 32-bit CSR field")]
    CsrOverflow { what: &'static str, value: u64 },
    /// The CSR payload is internally inconsistent.
    #[error("corrupt CSR data: {reason}")]
    CsrCorrupt { reason: String },
    /// The CSR header names a version this reader does not understand.
    #[error("unsupported CSR version {found}; expected {expected}")]
    UnsupportedCsrVersion { found: u8, expected: u8 },
}

/// Create `path` for writing, creating missing parent directories first.
///
/// # Errors
/// Returns [`GraphIoError::Io`] when a directory or the file cannot be
/// created.
pub fn create_output(path: &Path) -> Result<BufWriter<File>, GraphIoError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}
