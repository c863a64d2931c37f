//! Coordinate and geometry types shared by the transform pipeline and devices.
//!
//! Canonical CPU space:
//! - Logical drawing units (before scale, zoom and scroll are applied)
//! - Origin top-left
//! - +X right, +Y down
//!
//! `Mat4` is column-major, matching WGSL `mat4x4<f32>` uniform layout.

mod extent;
mod mat4;
mod rect;
mod vec2;

pub use extent::Extent;
pub use mat4::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
