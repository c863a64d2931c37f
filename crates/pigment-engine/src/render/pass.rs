use bytemuck::{Pod, Zeroable};

use crate::coords::{Extent, Mat4, Vec2};
use crate::device::PixelFormat;

use super::DrawCmd;

/// Policy for an attachment's prior contents at the start of a pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoadAction {
    /// Reset every texel to transparent black.
    #[default]
    Clear,
    /// Keep existing texels; draws accumulate.
    Preserve,
}

/// Transform block shared with shaders (`shape.wgsl`, binding 0).
///
/// `scroll` packs `[offset_x, offset_y, scale, 0]`, offset in device pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub projection: Mat4,
    pub scroll: [f32; 4],
}

impl TransformUniform {
    /// Maps a logical position to normalized device coordinates.
    pub fn to_ndc(&self, logical: Vec2) -> Vec2 {
        let [ox, oy, scale, _] = self.scroll;
        let device = logical * scale - Vec2::new(ox, oy);
        self.projection.transform_point2(device)
    }

    /// Maps a logical position to pixel coordinates of a `size` texture
    /// (top-left origin, pixel centers at `n + 0.5`).
    pub fn to_pixel(&self, logical: Vec2, size: Extent) -> Vec2 {
        let ndc = self.to_ndc(logical);
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * size.width as f32,
            (1.0 - ndc.y) * 0.5 * size.height as f32,
        )
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self { projection: Mat4::IDENTITY, scroll: [0.0, 0.0, 1.0, 0.0] }
    }
}

/// Everything a device needs to encode one render pass into a command buffer.
pub struct PassDesc<'a, T> {
    pub target: &'a T,
    pub size: Extent,
    pub format: PixelFormat,
    pub load: LoadAction,
    pub transform: TransformUniform,
    pub draws: &'a [DrawCmd],
}
