//! Error types for stack conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding MRC volumes or validating stack shapes.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("MRC header truncated: expected 1024 bytes, got {got}")]
    TruncatedHeader { got: usize },

    #[error("frame {index} truncated: expected {expected} bytes")]
    TruncatedFrame { index: u32, expected: usize },

    #[error("MRC volume truncated: expected at least {expected} bytes, file has {actual}")]
    TruncatedVolume { expected: u64, actual: u64 },

    #[error("invalid volume shape {frames}x{rows}x{cols}: every dimension must be non-zero")]
    InvalidShape { frames: u64, rows: u64, cols: u64 },

    #[error("expected a 3-D stack, dataset has {ndim} dimensions")]
    Rank { ndim: usize },

    #[error("frame shape {got:?} does not match volume frame shape {expected:?}")]
    FrameShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("frame count mismatch: declared {declared}, written {written}")]
    FrameCount { declared: u32, written: u32 },

    #[error("frame index {index} out of range for {frames} frames")]
    FrameIndex { index: u32, frames: u32 },
}

/// Errors produced by the conversion pipeline.
///
/// Every variant except [`Error::Config`] is confined to one stack: the batch
/// orchestrator records it against that file and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{object} not found in {}", path.display())]
    NotFound { path: PathBuf, object: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on a stream with no associated path.
    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("MRC export of {} failed: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(path: impl Into<PathBuf>, object: impl Into<String>) -> Self {
        Error::NotFound {
            path: path.into(),
            object: object.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
