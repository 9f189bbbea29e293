//! Geometric transforms over [`PixelBuffer`]s.
//!
//! Two families are provided:
//! - **Rigid** ([`RigidTransform`]): rotations by multiples of 90 degrees,
//!   mirrors and diagonal reflections. Pure pixel permutations.
//! - **Skew** ([`skew`]): resamples onto a canvas grown or shrunk by a pair
//!   of offsets, with anti-aliased splatting.
//!
//! Every transform reads an immutable source, allocates one fresh compact
//! destination, and fans work out through a [`Partitioner`].
//!
//! # Pipelines
//!
//! A [`Transform`] names one operation and can be deserialized, so editing
//! steps can be stored and replayed with [`apply_pipeline`]. Serialized,
//! a pipeline reads:
//!
//! ```text
//! ["rotate90", {"skew": {"x_offset": 8, "y_offset": 0}}]
//! ```

mod blend;
mod rigid;
mod skew;

pub use rigid::{
    flip_horizontal, flip_vertical, rotate180, rotate270, rotate90, transpose, transverse,
    RigidTransform,
};
pub use skew::{skew, SkewGeometry};

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::TransformError;
use crate::parallel::Partitioner;

/// A single transform step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
    Transpose,
    Transverse,
    Skew { x_offset: i32, y_offset: i32 },
}

impl Transform {
    /// The rigid transform this step performs, if any.
    pub fn as_rigid(self) -> Option<RigidTransform> {
        match self {
            Transform::Rotate90 => Some(RigidTransform::Rotate90),
            Transform::Rotate180 => Some(RigidTransform::Rotate180),
            Transform::Rotate270 => Some(RigidTransform::Rotate270),
            Transform::FlipHorizontal => Some(RigidTransform::FlipHorizontal),
            Transform::FlipVertical => Some(RigidTransform::FlipVertical),
            Transform::Transpose => Some(RigidTransform::Transpose),
            Transform::Transverse => Some(RigidTransform::Transverse),
            Transform::Skew { .. } => None,
        }
    }

    /// Destination size for a `width x height` source.
    pub fn output_size(self, width: u32, height: u32) -> Result<(u32, u32), TransformError> {
        match self {
            Transform::Skew { x_offset, y_offset } => {
                Ok(SkewGeometry::new(width, height, x_offset, y_offset)?.output_size())
            }
            rigid => Ok(rigid
                .as_rigid()
                .map_or((width, height), |t| t.output_size(width, height))),
        }
    }

    /// Run this step on `src`.
    pub fn apply<P: Partitioner>(
        self,
        src: &PixelBuffer,
        partitioner: &P,
    ) -> Result<PixelBuffer, TransformError> {
        match self {
            Transform::Skew { x_offset, y_offset } => skew(src, x_offset, y_offset, partitioner),
            rigid => match rigid.as_rigid() {
                Some(t) => t.apply(src, partitioner),
                None => Ok(src.to_compact()),
            },
        }
    }
}

impl From<RigidTransform> for Transform {
    fn from(t: RigidTransform) -> Self {
        match t {
            RigidTransform::Rotate90 => Transform::Rotate90,
            RigidTransform::Rotate180 => Transform::Rotate180,
            RigidTransform::Rotate270 => Transform::Rotate270,
            RigidTransform::FlipHorizontal => Transform::FlipHorizontal,
            RigidTransform::FlipVertical => Transform::FlipVertical,
            RigidTransform::Transpose => Transform::Transpose,
            RigidTransform::Transverse => Transform::Transverse,
        }
    }
}

/// Apply `steps` left to right.
///
/// An empty pipeline returns a compact copy of `src`. The first failing
/// step aborts the pipeline; no partial result is returned.
pub fn apply_pipeline<P: Partitioner>(
    src: &PixelBuffer,
    steps: &[Transform],
    partitioner: &P,
) -> Result<PixelBuffer, TransformError> {
    let Some((first, rest)) = steps.split_first() else {
        return Ok(src.to_compact());
    };

    let mut current = first.apply(src, partitioner)?;
    for step in rest {
        current = step.apply(&current, partitioner)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ExecutionStrategy;

    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..width * height * 4).map(|i| (i % 251) as u8).collect();
        PixelBuffer::from_raw(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rigid_roundtrip_through_transform() {
        for t in RigidTransform::ALL {
            assert_eq!(Transform::from(t).as_rigid(), Some(t));
        }
        assert_eq!(
            Transform::Skew {
                x_offset: 1,
                y_offset: 1
            }
            .as_rigid(),
            None
        );
    }

    #[test]
    fn test_output_size() {
        assert_eq!(Transform::Rotate90.output_size(4, 3), Ok((3, 4)));
        assert_eq!(Transform::FlipVertical.output_size(4, 3), Ok((4, 3)));
        assert_eq!(
            Transform::Skew {
                x_offset: 2,
                y_offset: -1
            }
            .output_size(4, 3),
            Ok((6, 2))
        );
        assert!(Transform::Skew {
            x_offset: -4,
            y_offset: 0
        }
        .output_size(4, 3)
        .is_err());
    }

    #[test]
    fn test_empty_pipeline_is_copy() {
        let img = test_image(3, 2);
        let result = apply_pipeline(&img, &[], &ExecutionStrategy::Serial).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_pipeline_matches_manual_steps() {
        let img = test_image(5, 3);
        let s = ExecutionStrategy::Parallel;
        let steps = [
            Transform::Rotate90,
            Transform::FlipHorizontal,
            Transform::Skew {
                x_offset: 2,
                y_offset: 1,
            },
        ];

        let manual = skew(&flip_horizontal(&rotate90(&img, &s).unwrap(), &s).unwrap(), 2, 1, &s)
            .unwrap();
        let piped = apply_pipeline(&img, &steps, &s).unwrap();
        assert_eq!(piped, manual);
        assert_eq!((piped.width(), piped.height()), (5, 6));
    }

    #[test]
    fn test_pipeline_stops_at_first_error() {
        let img = test_image(2, 2);
        let steps = [
            Transform::Rotate180,
            Transform::Skew {
                x_offset: -5,
                y_offset: 0,
            },
            Transform::Rotate90,
        ];
        let result = apply_pipeline(&img, &steps, &ExecutionStrategy::Serial);
        assert!(matches!(result, Err(TransformError::InvalidOffset { x_offset: -5, .. })));
    }

    #[test]
    fn test_transpose_is_rotate_then_flip() {
        let img = test_image(4, 3);
        let s = ExecutionStrategy::Serial;
        let via_steps =
            apply_pipeline(&img, &[Transform::Rotate270, Transform::FlipHorizontal], &s).unwrap();
        assert_eq!(transpose(&img, &s).unwrap(), via_steps);
    }
}
