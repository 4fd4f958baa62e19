//! Error type shared by the alignment and fusion pipeline.
//!
//! Numerical singularities and out-of-bounds sampling are deliberately *not*
//! represented here: both are internal control-flow decisions (skip the tile
//! update, discard the candidate shift) and never surface to callers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    /// A caller-supplied parameter was rejected at the entry point of the
    /// offending operation; no partial work was attempted.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two buffers that must share geometry do not.
    #[error("dimension mismatch: expected {expected_w}x{expected_h}x{expected_c}, got {got_w}x{got_h}x{got_c}")]
    DimensionMismatch {
        expected_w: usize,
        expected_h: usize,
        expected_c: usize,
        got_w: usize,
        got_h: usize,
        got_c: usize,
    },

    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize JSON for {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AlignError>;
