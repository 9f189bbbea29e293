//! Error type shared by every transform.

use thiserror::Error;

/// Errors that can occur while validating buffers or running a transform.
///
/// Every failure is reported before a destination buffer is handed back,
/// so a caller either receives a complete image or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Width or height is zero, or the stride cannot hold a full row.
    #[error(
        "Invalid geometry: {width}x{height} with stride {stride} (dimensions must be non-zero and stride at least width * 4)"
    )]
    InvalidGeometry {
        width: u32,
        height: u32,
        stride: usize,
    },

    /// Pixel storage is shorter than `stride * height`.
    #[error("Invalid pixel data: expected at least {expected} bytes (stride * height), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Skew offsets would leave no destination canvas.
    #[error("Invalid skew offsets ({x_offset}, {y_offset}) for a {width}x{height} image")]
    InvalidOffset {
        x_offset: i32,
        y_offset: i32,
        width: u32,
        height: u32,
    },

    /// A coordinate fell outside the buffer it addresses.
    #[error("Coordinate ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: u32,
        height: u32,
    },

    /// A fixed worker pool was requested with zero workers.
    #[error("Worker count must be greater than zero, got {0}")]
    InvalidWorkerCount(usize),

    /// The worker pool could not be started.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}
