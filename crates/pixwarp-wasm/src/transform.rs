//! WASM bindings for geometric transforms.
//!
//! Each binding copies the image into a core [`PixelBuffer`], runs the
//! transform serially, and hands back a new `JsPixelBuffer`. Failures
//! surface in JavaScript as thrown strings.

use crate::types::JsPixelBuffer;
use pixwarp_core::{
    apply_pipeline, ExecutionStrategy, Orientation, PixelBuffer, RigidTransform, Transform,
    TransformError,
};
use wasm_bindgen::prelude::*;

/// Browsers run each module on a single thread.
const STRATEGY: ExecutionStrategy = ExecutionStrategy::Serial;

fn to_js_error(e: TransformError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn run<F>(image: &JsPixelBuffer, op: F) -> Result<JsPixelBuffer, TransformError>
where
    F: FnOnce(&PixelBuffer) -> Result<PixelBuffer, TransformError>,
{
    let src = image.to_buffer()?;
    op(&src).map(JsPixelBuffer::from_buffer)
}

fn run_rigid(image: &JsPixelBuffer, t: RigidTransform) -> Result<JsPixelBuffer, JsValue> {
    run(image, |src| t.apply(src, &STRATEGY)).map_err(to_js_error)
}

/// Rotate 90 degrees counter-clockwise. Width and height swap.
#[wasm_bindgen]
pub fn rotate90(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::Rotate90)
}

/// Rotate 180 degrees.
#[wasm_bindgen]
pub fn rotate180(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::Rotate180)
}

/// Rotate 270 degrees counter-clockwise (90 clockwise). Width and height swap.
#[wasm_bindgen]
pub fn rotate270(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::Rotate270)
}

/// Mirror left to right.
#[wasm_bindgen]
pub fn flip_horizontal(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::FlipHorizontal)
}

/// Mirror top to bottom.
#[wasm_bindgen]
pub fn flip_vertical(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::FlipVertical)
}

/// Mirror across the main diagonal.
#[wasm_bindgen]
pub fn transpose(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::Transpose)
}

/// Mirror across the anti-diagonal.
#[wasm_bindgen]
pub fn transverse(image: &JsPixelBuffer) -> Result<JsPixelBuffer, JsValue> {
    run_rigid(image, RigidTransform::Transverse)
}

/// Resample onto a canvas grown (or shrunk) by the given offsets.
///
/// # Arguments
///
/// * `image` - Source image
/// * `x_offset` - Pixels added to the width (negative shrinks)
/// * `y_offset` - Pixels added to the height (negative shrinks)
///
/// # Errors
///
/// Throws if the offsets leave a destination dimension below 1.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const wider = skew(sourceImage, 120, 0);
/// ```
#[wasm_bindgen]
pub fn skew(
    image: &JsPixelBuffer,
    x_offset: i32,
    y_offset: i32,
) -> Result<JsPixelBuffer, JsValue> {
    run(image, |src| pixwarp_core::skew(src, x_offset, y_offset, &STRATEGY)).map_err(to_js_error)
}

/// Read the EXIF orientation (1-8) from encoded image bytes.
///
/// Returns 1 when the bytes carry no usable orientation.
#[wasm_bindgen]
pub fn orientation_from_exif(bytes: &[u8]) -> u8 {
    Orientation::from_exif(bytes) as u8
}

/// Turn an image upright for the given EXIF orientation value.
///
/// Values outside 1-8 are treated as 1 (no change).
#[wasm_bindgen]
pub fn apply_orientation(
    image: &JsPixelBuffer,
    orientation: u32,
) -> Result<JsPixelBuffer, JsValue> {
    let orientation = Orientation::from(orientation);
    run(image, |src| {
        pixwarp_core::apply_orientation(src, orientation, &STRATEGY)
    })
    .map_err(to_js_error)
}

/// Apply a list of transforms in order.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const out = apply_transforms(image, [
///   'rotate90',
///   { skew: { x_offset: 16, y_offset: -4 } },
/// ]);
/// ```
#[wasm_bindgen]
pub fn apply_transforms(image: &JsPixelBuffer, ops: JsValue) -> Result<JsPixelBuffer, JsValue> {
    let steps: Vec<Transform> = serde_wasm_bindgen::from_value(ops)
        .map_err(|e| JsValue::from_str(&format!("Invalid transform list: {}", e)))?;
    run(image, |src| apply_pipeline(src, &steps, &STRATEGY)).map_err(to_js_error)
}
