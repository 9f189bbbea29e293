//! RGBA pixel storage shared by every transform.
//!
//! A [`PixelBuffer`] is a rectangular grid of 4-byte pixels in
//! R, G, B, A order with non-premultiplied alpha. Rows may carry padding:
//! the pixel at `(x, y)` starts at byte `y * stride + x * 4`.
//!
//! Buffers produced by a transform are always compact (`stride == width * 4`)
//! and are read-only from the caller's side.

use image::{DynamicImage, RgbaImage};

use crate::error::TransformError;

/// Number of bytes in one pixel (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// A validated RGBA8 image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a compact, zero-initialised buffer.
    ///
    /// Every channel, alpha included, starts at 0.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` if a dimension is zero or `width * 4 * height`
    /// does not fit in `usize`.
    pub fn new(width: u32, height: u32) -> Result<Self, TransformError> {
        let len = storage_len(width, height).ok_or(TransformError::InvalidGeometry {
            width,
            height,
            stride: compact_stride(width),
        })?;
        let stride = compact_stride(width);
        validate_geometry(width, height, stride)?;
        Ok(Self {
            width,
            height,
            stride,
            pixels: vec![0u8; len],
        })
    }

    /// Wrap compact RGBA data (`stride == width * 4`).
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TransformError> {
        Self::from_raw_with_stride(width, height, compact_stride(width), pixels)
    }

    /// Wrap RGBA data whose rows are `stride` bytes apart.
    ///
    /// # Errors
    ///
    /// - `InvalidGeometry` if a dimension is zero or `stride < width * 4`
    /// - `InvalidPixelData` if `pixels` holds fewer than `stride * height` bytes
    pub fn from_raw_with_stride(
        width: u32,
        height: u32,
        stride: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, TransformError> {
        validate_geometry(width, height, stride)?;

        let expected = stride
            .checked_mul(height as usize)
            .ok_or(TransformError::InvalidGeometry {
                width,
                height,
                stride,
            })?;
        if pixels.len() < expected {
            return Err(TransformError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            pixels,
        })
    }

    /// Take ownership of an `image::RgbaImage`.
    pub fn from_rgba_image(img: RgbaImage) -> Result<Self, TransformError> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }

    /// Normalise any decoded image into the RGBA8 layout.
    pub fn from_dynamic_image(img: &DynamicImage) -> Result<Self, TransformError> {
        Self::from_rgba_image(img.to_rgba8())
    }

    /// Copy into an `image::RgbaImage`, dropping any row padding.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.to_compact().into_raw())
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of two consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// True when rows carry no padding.
    #[inline]
    pub fn is_compact(&self) -> bool {
        self.stride == compact_stride(self.width)
    }

    /// Raw storage, including row padding.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the buffer and return its storage.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Byte offset of the pixel at `(x, y)`.
    pub fn pixel_offset(&self, x: usize, y: usize) -> Result<usize, TransformError> {
        if x >= self.width as usize || y >= self.height as usize {
            return Err(TransformError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.stride + x * BYTES_PER_PIXEL)
    }

    /// The four channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Result<[u8; 4], TransformError> {
        let offset = self.pixel_offset(x, y)?;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Ok(rgba)
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: usize) -> Result<&[u8], TransformError> {
        let start = self.pixel_offset(0, y)?;
        Ok(&self.pixels[start..start + compact_stride(self.width)])
    }

    /// Copy into a buffer with `stride == width * 4`.
    pub fn to_compact(&self) -> PixelBuffer {
        if self.is_compact() && self.pixels.len() == self.stride * self.height as usize {
            return self.clone();
        }

        let row_len = compact_stride(self.width);
        let mut pixels = Vec::with_capacity(row_len * self.height as usize);
        for row in self.pixels.chunks(self.stride).take(self.height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        PixelBuffer {
            width: self.width,
            height: self.height,
            stride: row_len,
            pixels,
        }
    }
}

#[inline]
fn compact_stride(width: u32) -> usize {
    (width as usize).saturating_mul(BYTES_PER_PIXEL)
}

/// Bytes needed for a compact `width x height` buffer, `None` on overflow.
pub(crate) fn storage_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(BYTES_PER_PIXEL)?
        .checked_mul(height as usize)
}

fn validate_geometry(width: u32, height: u32, stride: usize) -> Result<(), TransformError> {
    if width == 0 || height == 0 || stride < compact_stride(width) {
        return Err(TransformError::InvalidGeometry {
            width,
            height,
            stride,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x3 buffer with one padding pixel per row.
    fn padded_buffer() -> PixelBuffer {
        let pixels = vec![
            1, 2, 3, 4, 5, 6, 7, 8, 0xEE, 0xEE, 0xEE, 0xEE, //
            9, 10, 11, 12, 13, 14, 15, 16, 0xEE, 0xEE, 0xEE, 0xEE, //
            17, 18, 19, 20, 21, 22, 23, 24, 0xEE, 0xEE, 0xEE, 0xEE,
        ];
        PixelBuffer::from_raw_with_stride(2, 3, 12, pixels).unwrap()
    }

    #[test]
    fn test_new_is_zeroed() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.stride(), 12);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 5),
            Err(TransformError::InvalidGeometry { width: 0, .. })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(5, 0, vec![]),
            Err(TransformError::InvalidGeometry { height: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_allocation_rejected() {
        assert!(matches!(
            PixelBuffer::new(u32::MAX, u32::MAX),
            Err(TransformError::InvalidGeometry { .. })
        ));
        assert_eq!(storage_len(3, 2), Some(24));
        assert_eq!(storage_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_short_stride_rejected() {
        let result = PixelBuffer::from_raw_with_stride(2, 2, 7, vec![0u8; 16]);
        assert_eq!(
            result,
            Err(TransformError::InvalidGeometry {
                width: 2,
                height: 2,
                stride: 7
            })
        );
    }

    #[test]
    fn test_short_pixel_data_rejected() {
        let result = PixelBuffer::from_raw(2, 2, vec![0u8; 15]);
        assert_eq!(
            result,
            Err(TransformError::InvalidPixelData {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_pixel_offset_uses_stride() {
        let buf = padded_buffer();
        assert_eq!(buf.pixel_offset(0, 0).unwrap(), 0);
        assert_eq!(buf.pixel_offset(1, 0).unwrap(), 4);
        assert_eq!(buf.pixel_offset(0, 2).unwrap(), 24);
        assert_eq!(buf.pixel(1, 2).unwrap(), [21, 22, 23, 24]);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let buf = padded_buffer();
        assert_eq!(
            buf.pixel(2, 0),
            Err(TransformError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 3
            })
        );
        assert!(buf.pixel(0, 3).is_err());
        assert!(buf.row(3).is_err());
    }

    #[test]
    fn test_row_excludes_padding() {
        let buf = padded_buffer();
        assert_eq!(buf.row(1).unwrap(), &[9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_to_compact_drops_padding() {
        let buf = padded_buffer();
        assert!(!buf.is_compact());

        let compact = buf.to_compact();
        assert!(compact.is_compact());
        assert_eq!(compact.stride(), 8);
        assert_eq!(compact.as_bytes().len(), 24);
        assert_eq!(compact.pixel(1, 2).unwrap(), [21, 22, 23, 24]);
    }

    #[test]
    fn test_rgba_image_conversion() {
        let img = RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 128]).unwrap();
        let buf = PixelBuffer::from_rgba_image(img).unwrap();
        assert_eq!(buf.pixel(1, 0).unwrap(), [0, 255, 0, 128]);

        let back = buf.to_rgba_image().unwrap();
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_from_dynamic_image_adds_opaque_alpha() {
        let rgb = image::RgbImage::from_raw(1, 1, vec![10, 20, 30]).unwrap();
        let buf = PixelBuffer::from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(buf.pixel(0, 0).unwrap(), [10, 20, 30, 255]);
    }
}
