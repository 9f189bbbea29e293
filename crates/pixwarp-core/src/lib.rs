//! Pixwarp Core - Geometric transforms for RGBA pixel buffers
//!
//! This crate provides lossless rotations and mirrors, an anti-aliased skew
//! warp, EXIF orientation correction, and the row-band partitioning that
//! spreads each transform across worker threads.

pub mod buffer;
pub mod error;
pub mod orientation;
pub mod parallel;
pub mod transform;

pub use buffer::{PixelBuffer, BYTES_PER_PIXEL};
pub use error::TransformError;
pub use orientation::{apply_orientation, Orientation};
pub use parallel::{ExecutionStrategy, Partitioner};
pub use transform::{
    apply_pipeline, flip_horizontal, flip_vertical, rotate180, rotate270, rotate90, skew,
    transpose, transverse, RigidTransform, SkewGeometry, Transform,
};
