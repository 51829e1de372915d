//! The failure taxonomy shared by every operator in this crate.
//!
//! Operators never panic on bad input and never produce a partially formed
//! buffer: every fallible entry point returns `Result<PixelBuffer, ImageError>`
//! and on the error path nothing was allocated or, if it was, it is dropped
//! before the error value escapes.

use thiserror::Error;

/// The error surface of the raster core.
///
/// Kinds, not names: callers branch on the variant, not on the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImageError {
    /// Illegal dimensions, an unknown enum value (blend mode, fit mode,
    /// resize kernel), a non-odd convolution kernel, or a negative
    /// parameter that the operator's "`<= 0` means clone" convention does
    /// not cover.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A compositing offset or tiled coordinate overflowed integer
    /// arithmetic before it could be clamped.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Allocation failed for a newly created buffer.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A bit depth other than 8, or a color space other than sRGB,
    /// linear-sRGB, or display-P3, was requested.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl ImageError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ImageError::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_bounds(msg: impl Into<String>) -> Self {
        ImageError::OutOfBounds(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        ImageError::Unsupported(msg.into())
    }
}

pub type Result<T> = core::result::Result<T, ImageError>;
