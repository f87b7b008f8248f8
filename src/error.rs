use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building, deriving or (de)serializing a camera geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unknown camera '{0}'")]
    UnknownCamera(String),

    #[error("length mismatch: '{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate pixel id {0}")]
    DuplicatePixelId(i64),

    #[error("unrecognized pixel type '{0}' (expected hexagonal or rectangular)")]
    UnknownPixelType(String),

    #[error("unrecognized unit '{0}'")]
    UnknownUnit(String),

    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),

    #[error("incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("need at least 2 distinct pixel positions, got {0}")]
    TooFewPixels(usize),

    #[error("pixel index {index} out of range for {len} pixels")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("neighbor list of pixel {pixel} references index {neighbor}, but there are only {len} pixels")]
    InvalidNeighbor {
        pixel: usize,
        neighbor: usize,
        len: usize,
    },

    #[error("invalid grid configuration: {0}")]
    InvalidGridConfig(String),

    #[error("table is missing column '{0}'")]
    MissingColumn(String),

    #[error("table is missing metadata key '{0}'")]
    MissingMetadata(String),

    #[error("invalid table field '{field}': {reason}")]
    InvalidTableField { field: String, reason: String },

    #[error("file {0} already exists (pass overwrite to replace it)")]
    FileExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("binary table (de)serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
