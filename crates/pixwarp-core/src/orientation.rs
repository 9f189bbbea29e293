//! EXIF orientation handling.
//!
//! Cameras store pixels in sensor order and record in the EXIF
//! `Orientation` tag how the image must be turned for display. Each of the
//! eight tag values corresponds to one rigid transform.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::TransformError;
use crate::parallel::Partitioner;
use crate::transform::RigidTransform;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Mirrored across the main diagonal.
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Mirrored across the anti-diagonal.
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Every orientation, in tag order.
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90CW,
        Orientation::Transverse,
        Orientation::Rotate270CW,
    ];

    /// Returns true if correcting this orientation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The transform that brings a stored image upright, `None` for `Normal`.
    ///
    /// [`RigidTransform::Rotate90`] turns counter-clockwise, so a camera
    /// that recorded a clockwise turn is corrected with `Rotate270`.
    pub fn correction(self) -> Option<RigidTransform> {
        match self {
            Orientation::Normal => None,
            Orientation::FlipHorizontal => Some(RigidTransform::FlipHorizontal),
            Orientation::Rotate180 => Some(RigidTransform::Rotate180),
            Orientation::FlipVertical => Some(RigidTransform::FlipVertical),
            Orientation::Transpose => Some(RigidTransform::Transpose),
            Orientation::Rotate90CW => Some(RigidTransform::Rotate270),
            Orientation::Transverse => Some(RigidTransform::Transverse),
            Orientation::Rotate270CW => Some(RigidTransform::Rotate90),
        }
    }

    /// Read the orientation tag from an image container (JPEG, TIFF, PNG, ...).
    ///
    /// Returns `Orientation::Normal` if no EXIF data is found or orientation
    /// cannot be determined.
    pub fn from_exif(bytes: &[u8]) -> Orientation {
        let mut cursor = Cursor::new(bytes);

        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => exif
                .get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
                .map_or(Orientation::Normal, Orientation::from),
            Err(e) => {
                log::debug!("no usable EXIF orientation: {}", e);
                Orientation::Normal
            }
        }
    }
}

/// Unknown tag values fall back to `Normal`.
impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        Orientation::ALL
            .into_iter()
            .find(|&o| o as u32 == value)
            .unwrap_or_default()
    }
}

/// Turn a stored image upright according to its EXIF orientation.
///
/// `Normal` yields a compact copy of `src`.
pub fn apply_orientation<P: Partitioner>(
    src: &PixelBuffer,
    orientation: Orientation,
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    match orientation.correction() {
        Some(t) => t.apply(src, partitioner),
        None => Ok(src.to_compact()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ExecutionStrategy;
    use image::{DynamicImage, ImageBuffer, Rgba};

    /// JPEG markers around a big-endian TIFF block holding only the
    /// orientation tag.
    fn jpeg_with_orientation(value: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x22];
        bytes.extend_from_slice(b"Exif\0\0");
        bytes.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
        bytes.extend_from_slice(&[0x00, 0x01]);
        bytes.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x00, value, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..width * height)
            .flat_map(|i| [i as u8, (i * 3) as u8, 255 - i as u8, 255])
            .collect();
        PixelBuffer::from_raw(width, height, pixels).unwrap()
    }

    #[test]
    fn test_tag_values_roundtrip() {
        for (tag, orientation) in (1u32..).zip(Orientation::ALL) {
            assert_eq!(orientation as u32, tag);
            assert_eq!(Orientation::from(tag), orientation);
        }
    }

    #[test]
    fn test_unknown_tag_is_normal() {
        for tag in [0, 9, 255, u32::MAX] {
            assert_eq!(Orientation::from(tag), Orientation::Normal, "tag {}", tag);
        }
    }

    #[test]
    fn test_swaps_dimensions_matches_correction() {
        for orientation in Orientation::ALL {
            let swaps = orientation
                .correction()
                .is_some_and(RigidTransform::swaps_dimensions);
            assert_eq!(orientation.swaps_dimensions(), swaps, "{:?}", orientation);
        }
    }

    #[test]
    fn test_from_exif_reads_tag() {
        assert_eq!(
            Orientation::from_exif(&jpeg_with_orientation(6)),
            Orientation::Rotate90CW
        );
        assert_eq!(
            Orientation::from_exif(&jpeg_with_orientation(3)),
            Orientation::Rotate180
        );
    }

    #[test]
    fn test_from_exif_invalid_data() {
        assert_eq!(Orientation::from_exif(&[0x00, 0x01, 0x02]), Orientation::Normal);
        assert_eq!(Orientation::from_exif(&[]), Orientation::Normal);
    }

    #[test]
    fn test_normal_is_copy() {
        let img = test_image(3, 2);
        let result = apply_orientation(&img, Orientation::Normal, &ExecutionStrategy::Serial).unwrap();
        assert_eq!(result, img);
    }

    /// Corrections agree with the `image` crate's own orientation operations.
    #[test]
    fn test_matches_image_crate() {
        let img = test_image(4, 3);
        let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> = img.to_rgba_image().unwrap();
        let dynamic = DynamicImage::ImageRgba8(rgba);

        let cases = [
            (Orientation::FlipHorizontal, dynamic.fliph()),
            (Orientation::Rotate180, dynamic.rotate180()),
            (Orientation::FlipVertical, dynamic.flipv()),
            (Orientation::Transpose, dynamic.rotate90().fliph()),
            (Orientation::Rotate90CW, dynamic.rotate90()),
            (Orientation::Transverse, dynamic.rotate270().fliph()),
            (Orientation::Rotate270CW, dynamic.rotate270()),
        ];

        for (orientation, expected) in cases {
            let result =
                apply_orientation(&img, orientation, &ExecutionStrategy::Fixed(2)).unwrap();
            let expected = PixelBuffer::from_dynamic_image(&expected).unwrap();
            assert_eq!(result, expected, "{:?}", orientation);
        }
    }
}
