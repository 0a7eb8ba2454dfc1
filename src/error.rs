//! Validation errors reported by the mapping core
//!
//! Every variant is a local, recoverable failure: the operation that raised it
//! leaves the previously published state untouched.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjustError {
    /// Window width is not positive, or width/center are not finite
    #[error("Invalid window: width={width}, center={center}")]
    InvalidWindow { width: f64, center: f64 },

    #[error("Invalid valid bits: {0} (expected 1 to 16)")]
    InvalidValidBits(u8),

    #[error("Color table too large: {entries} entries exceeds capacity of {capacity}")]
    ColorTableTooLarge { entries: usize, capacity: usize },

    /// Byte length is zero or not a multiple of 3
    #[error("Malformed color table: {0} bytes is not a whole number of RGB entries")]
    MalformedColorTable(usize),

    #[error("Unsupported bit depth: {0} (expected 8, 12, or 16)")]
    UnsupportedBitDepth(u16),

    #[error("Sample buffer holds {actual} values, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, AdjustError>;
