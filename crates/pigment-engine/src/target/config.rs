use crate::coords::Extent;
use crate::device::PixelFormat;

/// Construction parameters for a [`RenderTarget`](super::RenderTarget).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetConfig {
    /// Drawable size in pixels. A degenerate size yields an empty target.
    pub size: Extent,

    /// Color-buffer format.
    pub format: PixelFormat,

    /// Native display density (device pixels per logical point).
    ///
    /// Injected by the host instead of being queried from the display, so the
    /// scroll transform stays a pure function of its inputs.
    pub native_scale: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            size: Extent::new(0, 0),
            format: PixelFormat::Rgba8Unorm,
            native_scale: 1.0,
        }
    }
}
