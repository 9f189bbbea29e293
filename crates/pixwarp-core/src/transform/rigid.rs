//! Lossless rotations and mirrors.
//!
//! Each operation is a permutation of pixel positions: every source pixel is
//! copied, byte for byte, to exactly one destination pixel. Work is split by
//! destination row, so no two workers ever write the same byte.
//!
//! For a `W x H` source, the destination coordinate `(dx, dy)` reads from:
//!
//! ```text
//! rotate90   (H x W)  sx = W - dy - 1   sy = dx
//! rotate180  (W x H)  sx = W - dx - 1   sy = H - dy - 1
//! rotate270  (H x W)  sx = dy           sy = H - dx - 1
//! flip_h     (W x H)  sx = W - dx - 1   sy = dy
//! flip_v     (W x H)  sx = dx           sy = H - dy - 1
//! transpose  (H x W)  sx = dy           sy = dx
//! transverse (H x W)  sx = W - dy - 1   sy = H - dx - 1
//! ```
//!
//! Rotations are counter-clockwise.

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, BYTES_PER_PIXEL};
use crate::error::TransformError;
use crate::parallel::Partitioner;

/// A coordinate permutation from the dihedral group of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigidTransform {
    /// Rotate 90 degrees counter-clockwise.
    Rotate90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees counter-clockwise (90 clockwise).
    Rotate270,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Reflect about the main diagonal.
    Transpose,
    /// Reflect about the anti-diagonal.
    Transverse,
}

impl RigidTransform {
    /// All rigid transforms, in declaration order.
    pub const ALL: [RigidTransform; 7] = [
        RigidTransform::Rotate90,
        RigidTransform::Rotate180,
        RigidTransform::Rotate270,
        RigidTransform::FlipHorizontal,
        RigidTransform::FlipVertical,
        RigidTransform::Transpose,
        RigidTransform::Transverse,
    ];

    /// Returns true if the destination swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            RigidTransform::Rotate90
                | RigidTransform::Rotate270
                | RigidTransform::Transpose
                | RigidTransform::Transverse
        )
    }

    /// Destination `(width, height)` for a `width x height` source.
    #[inline]
    pub fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// The transform that undoes this one.
    pub fn inverse(self) -> RigidTransform {
        match self {
            RigidTransform::Rotate90 => RigidTransform::Rotate270,
            RigidTransform::Rotate270 => RigidTransform::Rotate90,
            other => other,
        }
    }

    /// Source coordinate read by destination `(dx, dy)`.
    ///
    /// `width` and `height` are the source dimensions. The destination
    /// coordinate must lie inside [`output_size`](Self::output_size).
    #[inline]
    pub fn source_coordinate(
        self,
        dx: usize,
        dy: usize,
        width: usize,
        height: usize,
    ) -> (usize, usize) {
        match self {
            RigidTransform::Rotate90 => (width - dy - 1, dx),
            RigidTransform::Rotate180 => (width - dx - 1, height - dy - 1),
            RigidTransform::Rotate270 => (dy, height - dx - 1),
            RigidTransform::FlipHorizontal => (width - dx - 1, dy),
            RigidTransform::FlipVertical => (dx, height - dy - 1),
            RigidTransform::Transpose => (dy, dx),
            RigidTransform::Transverse => (width - dy - 1, height - dx - 1),
        }
    }

    /// Apply the transform, returning a new compact buffer.
    ///
    /// The source is never modified.
    pub fn apply<P: Partitioner>(
        self,
        src: &PixelBuffer,
        partitioner: &P,
    ) -> Result<PixelBuffer, TransformError> {
        let (src_w, src_h) = (src.width() as usize, src.height() as usize);
        let (dst_w, dst_h) = self.output_size(src.width(), src.height());
        log::debug!(
            "{:?}: {}x{} -> {}x{}",
            self,
            src_w,
            src_h,
            dst_w,
            dst_h
        );

        let mut dst = PixelBuffer::new(dst_w, dst_h)?;
        let row_len = dst.stride();

        partitioner.run_bands(dst.as_bytes_mut(), row_len, |rows, band| {
            for (dst_y, row) in rows.zip(band.chunks_exact_mut(row_len)) {
                for (dst_x, out) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    let (src_x, src_y) = self.source_coordinate(dst_x, dst_y, src_w, src_h);
                    let src_off = src.pixel_offset(src_x, src_y)?;
                    out.copy_from_slice(&src.as_bytes()[src_off..src_off + BYTES_PER_PIXEL]);
                }
            }
            Ok(())
        })?;

        Ok(dst)
    }
}

/// Rotate 90 degrees counter-clockwise.
pub fn rotate90<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::Rotate90.apply(src, partitioner)
}

/// Rotate 180 degrees.
pub fn rotate180<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::Rotate180.apply(src, partitioner)
}

/// Rotate 270 degrees counter-clockwise.
pub fn rotate270<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::Rotate270.apply(src, partitioner)
}

/// Mirror the image left to right.
pub fn flip_horizontal<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::FlipHorizontal.apply(src, partitioner)
}

/// Mirror the image top to bottom.
pub fn flip_vertical<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::FlipVertical.apply(src, partitioner)
}

/// Reflect about the main diagonal.
pub fn transpose<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::Transpose.apply(src, partitioner)
}

/// Reflect about the anti-diagonal.
pub fn transverse<P: Partitioner>(
    src: &PixelBuffer,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    RigidTransform::Transverse.apply(src, partitioner)
}
