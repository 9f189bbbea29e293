//! Keystone-style skew with anti-aliased forward splatting.
//!
//! The destination is `(W + x_offset) x (H + y_offset)`. Points move away
//! from (or towards) the image centre in proportion to their distance from
//! it, so the whole source fills the resized canvas.
//!
//! # Algorithm
//!
//! Per axis, with `c_src = W / 2` and `c_dst = (W + x_offset) / 2`:
//!
//! ```text
//! forward:  d = s + (c_dst - c_src) + (s / c_src - 1) * offset / 2
//! inverse:  s = c_src + (d - c_dst) - delta / 2,  delta = (d / c_dst - 1) * offset
//! ```
//!
//! 1. Every source pixel is forward-mapped to a real-valued destination
//!    point and splatted onto the 2x2 pixels around it with bilinear weights
//!    blended as described on `blend_pixel`.
//! 2. Destination pixels that no splat reached are filled with the source
//!    pixel under their inverse-mapped sample point.
//!
//! Sample coordinates are clamped to the nearest edge pixel and splat
//! targets outside the canvas are discarded, so no offset can address
//! memory outside either buffer.
//!
//! # Concurrency
//!
//! Work is split by destination row. A worker visits every source pixel
//! whose splat can reach its rows, in source scan order, and applies only
//! the writes that land in its own rows. Samples straddling a band seam are
//! evaluated by both neighbours. Each destination pixel therefore sees the
//! same sequence of blends whatever the partitioning, and the output is
//! byte-identical for any worker count.

use crate::buffer::{storage_len, PixelBuffer, BYTES_PER_PIXEL};
use crate::error::TransformError;
use crate::parallel::Partitioner;

use super::blend::{blend_pixel, splat_targets, Coverage, EPSILON};

/// Coordinate mapping between a source image and its skewed canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewGeometry {
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    x_offset: f64,
    y_offset: f64,
}

impl SkewGeometry {
    /// Build the mapping for a `width x height` source.
    ///
    /// # Errors
    ///
    /// - `InvalidGeometry` if the source is empty
    /// - `InvalidOffset` if the destination would have a dimension below 1
    ///   or too many bytes to address
    pub fn new(
        width: u32,
        height: u32,
        x_offset: i32,
        y_offset: i32,
    ) -> Result<Self, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::InvalidGeometry {
                width,
                height,
                stride: width as usize * BYTES_PER_PIXEL,
            });
        }

        let invalid = || TransformError::InvalidOffset {
            x_offset,
            y_offset,
            width,
            height,
        };
        let dst_width = u32::try_from(i64::from(width) + i64::from(x_offset))
            .ok()
            .filter(|&w| w > 0)
            .ok_or_else(invalid)?;
        let dst_height = u32::try_from(i64::from(height) + i64::from(y_offset))
            .ok()
            .filter(|&h| h > 0)
            .ok_or_else(invalid)?;
        if storage_len(dst_width, dst_height).is_none() {
            return Err(invalid());
        }

        Ok(Self {
            src_width: width,
            src_height: height,
            dst_width,
            dst_height,
            x_offset: f64::from(x_offset),
            y_offset: f64::from(y_offset),
        })
    }

    /// Destination `(width, height)`.
    #[inline]
    pub fn output_size(&self) -> (u32, u32) {
        (self.dst_width, self.dst_height)
    }

    /// Real-valued destination point of source pixel `(sx, sy)`.
    pub fn forward(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            forward_axis(sx, self.src_width, self.dst_width, self.x_offset),
            forward_axis(sy, self.src_height, self.dst_height, self.y_offset),
        )
    }

    /// Real-valued source point sampled by destination `(dx, dy)`.
    pub fn inverse(&self, dx: f64, dy: f64) -> (f64, f64) {
        (
            inverse_axis(dx, self.src_width, self.dst_width, self.x_offset),
            inverse_axis(dy, self.src_height, self.dst_height, self.y_offset),
        )
    }

    /// Source pixel sampled by destination `(dx, dy)`, clamped to the edges.
    pub fn sample_coordinate(&self, dx: f64, dy: f64) -> (usize, usize) {
        let (sx, sy) = self.inverse(dx, dy);
        (clamp_index(sx, self.src_width), clamp_index(sy, self.src_height))
    }
}

#[inline]
fn center(len: u32) -> f64 {
    f64::from(len) / 2.0
}

#[inline]
fn forward_axis(s: f64, src_len: u32, dst_len: u32, offset: f64) -> f64 {
    let src_c = center(src_len);
    s + (center(dst_len) - src_c) + (s / src_c - 1.0) * offset / 2.0
}

#[inline]
fn inverse_axis(d: f64, src_len: u32, dst_len: u32, offset: f64) -> f64 {
    let dst_c = center(dst_len);
    let delta = (d / dst_c - 1.0) * offset;
    center(src_len) + (d - dst_c) - delta / 2.0
}

/// Truncate to a pixel index inside `[0, len)`.
#[inline]
fn clamp_index(v: f64, len: u32) -> usize {
    // NaN and negatives land on 0, huge values on the last pixel.
    (v.floor().max(0.0) as usize).min(len as usize - 1)
}

/// Skew `src` around its centre onto a `(W + x_offset) x (H + y_offset)` canvas.
///
/// Negative offsets shrink the canvas. The source is never modified.
///
/// # Errors
///
/// Returns `InvalidOffset` if either destination dimension would be below 1
/// or the canvas would not fit in memory.
pub fn skew<P: Partitioner>(
    src: &PixelBuffer,
    x_offset: i32,
    y_offset: i32,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    let geometry = SkewGeometry::new(src.width(), src.height(), x_offset, y_offset)?;
    let (dst_width, dst_height) = geometry.output_size();
    log::debug!(
        "skew ({}, {}): {}x{} -> {}x{}",
        x_offset,
        y_offset,
        src.width(),
        src.height(),
        dst_width,
        dst_height
    );

    let mut dst = PixelBuffer::new(dst_width, dst_height)?;
    let row_len = dst.stride();
    let dst_w = dst_width as usize;
    let (src_w, src_h) = (src.width() as usize, src.height() as usize);

    partitioner.run_bands(dst.as_bytes_mut(), row_len, |rows, band| {
        let (first, last) = (rows.start as i64, rows.end as i64);
        let mut coverage = vec![Coverage::default(); rows.len() * dst_w];

        for sy in 0..src_h {
            let (_, fy) = geometry.forward(0.0, sy as f64);
            let y0 = fy.floor() as i64;
            if y0 + 1 < first || y0 >= last {
                continue;
            }

            for sx in 0..src_w {
                let (fx, _) = geometry.forward(sx as f64, 0.0);
                let color = src.pixel(sx, sy)?;

                for target in splat_targets(fx, fy) {
                    if target.weight < EPSILON
                        || target.x < 0
                        || target.x >= dst_w as i64
                        || target.y < first
                        || target.y >= last
                    {
                        continue;
                    }
                    let local = (target.y - first) as usize * dst_w + target.x as usize;
                    let off = local * BYTES_PER_PIXEL;
                    blend_pixel(
                        &mut band[off..off + BYTES_PER_PIXEL],
                        &mut coverage[local],
                        color,
                        target.weight,
                    );
                }
            }
        }

        for (local, cov) in coverage.iter().enumerate() {
            if !cov.is_empty() {
                continue;
            }
            let dx = local % dst_w;
            let dy = rows.start + local / dst_w;
            let (sx, sy) = geometry.sample_coordinate(dx as f64, dy as f64);
            let color = src.pixel(sx, sy)?;
            let off = local * BYTES_PER_PIXEL;
            band[off..off + BYTES_PER_PIXEL].copy_from_slice(&color);
        }

        Ok(())
    })?;

    Ok(dst)
}
