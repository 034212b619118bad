// src/error.rs

use std::io;
use thiserror::Error;

/// Errors raised by the hysteresis model and its drivers.
#[derive(Debug, Error)]
pub enum SimError {
    /// A construction parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A direction name other than "up" or "down".
    #[error("direction must be either \"up\" or \"down\", got \"{0}\"")]
    InvalidDirection(String),

    /// Two grids of different size passed to a grid-wise operation.
    #[error("grid shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    /// Row or column index past the end of the detector.
    #[error("{axis} index {index} out of range (len {len})")]
    OutOfBounds {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
