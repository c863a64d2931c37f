//! Pigment engine crate.
//!
//! Offscreen render targets for a painting canvas: a zero-initialized color
//! buffer, a deferred command session and the scale/zoom/pan transform, over
//! either a headless wgpu device or a CPU reference device.

pub mod device;
pub mod target;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;

pub use device::{GpuDevice, PixelData, PixelFormat, SoftwareDevice, TargetError, WgpuDevice};
pub use target::{DrawEncoder, RenderTarget, TargetConfig, TargetState};
