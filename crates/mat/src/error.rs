use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a MAT file
#[derive(Debug, Error)]
pub enum MatError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file is too short to hold a MAT header ({0} bytes)")]
    TooShort(usize),

    #[error("not a level-5 MAT file")]
    NotMatFile,

    #[error("invalid endian indicator {0:?}")]
    BadEndianIndicator([u8; 2]),

    /// Version 0x0200 marks the HDF5-based 7.3 layout
    #[error("unsupported MAT file version {0:#06x}")]
    UnsupportedVersion(u16),

    #[error("truncated data element at offset {offset}")]
    Truncated { offset: usize },

    #[error("expected {expected}, found data type {found}")]
    UnexpectedType { expected: &'static str, found: u32 },

    #[error("invalid data element: {0}")]
    Invalid(String),

    #[error("failed to decompress data element: {0}")]
    Decompress(#[source] io::Error),
}
