use thiserror::Error;

use crate::gallery::DrawingId;

/// Errors produced while turning strokes into a raster snapshot
#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("Invalid snapshot dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Rasterizer stopped before producing a snapshot")]
    Cancelled,
}

/// Errors that can occur while saving the canvas as a drawing
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("A save is already in progress")]
    InProgress,

    #[error("Failed to rasterize drawing: {0}")]
    Rasterize(#[from] RasterizeError),
}

/// Errors that can occur while handing a snapshot to a download sink
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Drawing not found: {0}")]
    NotFound(DrawingId),

    #[error("Failed to write download: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("No download location is available")]
    Unavailable,

    #[error("Browser refused the download: {0}")]
    Browser(String),
}
