//! Pixwarp WASM - WebAssembly bindings for Pixwarp
//!
//! This crate exposes the pixwarp-core transforms to JavaScript/TypeScript
//! applications. Every binding runs serially on the calling thread.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for RGBA pixel buffers
//! - `transform` - Rotation, mirror, skew and orientation bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsPixelBuffer, rotate90, apply_transforms } from '@pixwarp/wasm';
//!
//! await init();
//!
//! const image = new JsPixelBuffer(width, height, rgba);
//! const turned = rotate90(image);
//! const edited = apply_transforms(image, ['flip_horizontal', { skew: { x_offset: 40, y_offset: 0 } }]);
//! ```

use wasm_bindgen::prelude::*;

mod transform;
mod types;

pub use transform::{
    apply_orientation, apply_transforms, flip_horizontal, flip_vertical, orientation_from_exif,
    rotate180, rotate270, rotate90, skew, transpose, transverse,
};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
