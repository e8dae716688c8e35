//! Error types for mask editing operations.

use thiserror::Error;

/// Errors that can occur while loading, editing or exporting a mask.
///
/// Only conditions the session cannot recover from are errors. Empty
/// history, a missing selection or out-of-range parameters are reported
/// through [`crate::session::Outcome`] or coerced instead.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The image or mask raster could not be decoded or encoded
    #[error("Image error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image has no pixels
    #[error("Image has zero size: {width}x{height}")]
    EmptyImage {
        /// Width of the rejected image
        width: u32,
        /// Height of the rejected image
        height: u32,
    },

    /// The mask buffer could not be allocated
    #[error("Failed to allocate {bytes} bytes for the mask buffer")]
    Allocation {
        /// Number of bytes requested
        bytes: usize,
    },
}

impl EditorError {
    /// Create an empty image error.
    pub fn empty_image(width: u32, height: u32) -> Self {
        Self::EmptyImage { width, height }
    }

    /// Whether this error came from decoding a raster.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::ImageDecode(_) | Self::EmptyImage { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;
