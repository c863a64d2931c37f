//! CPU rasterizer backing `SoftwareDevice`.
//!
//! Coverage follows the GPU rules the wgpu pipeline relies on: a texel is
//! covered when its center lies inside the shape (half-open on the max edge for
//! rectangles, inclusive boundary for dabs). No anti-aliasing on either side.

use core::ops::Range;

use crate::coords::{Extent, Vec2};
use crate::device::PixelFormat;
use crate::paint::Color;

use super::{DrawCmd, LoadAction, TransformUniform};

/// Mutable view over tightly packed texels.
pub(crate) struct Canvas<'a> {
    pub size: Extent,
    pub format: PixelFormat,
    pub texels: &'a mut [u8],
}

impl Canvas<'_> {
    /// Executes one recorded pass.
    pub fn run_pass(&mut self, load: LoadAction, transform: &TransformUniform, draws: &[DrawCmd]) {
        if load == LoadAction::Clear {
            self.texels.fill(0);
        }
        for cmd in draws.iter().filter(|c| c.is_drawable()) {
            match *cmd {
                DrawCmd::Rect { rect, color } => {
                    let a = transform.to_pixel(rect.min(), self.size);
                    let b = transform.to_pixel(rect.max(), self.size);
                    let xs = center_span(a.x, b.x, self.size.width);
                    let ys = center_span(a.y, b.y, self.size.height);
                    for y in ys {
                        for x in xs.clone() {
                            self.blend(x, y, color);
                        }
                    }
                }
                DrawCmd::Dab { center, radius, color } => {
                    self.fill_dab(transform, center, radius, color);
                }
            }
        }
    }

    fn fill_dab(&mut self, transform: &TransformUniform, center: Vec2, radius: f32, color: Color) {
        let c = transform.to_pixel(center, self.size);
        let rx = (transform.to_pixel(center + Vec2::new(radius, 0.0), self.size).x - c.x).abs();
        let ry = (transform.to_pixel(center + Vec2::new(0.0, radius), self.size).y - c.y).abs();
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }

        let xs = center_span(c.x - rx, c.x + rx, self.size.width);
        let ys = center_span(c.y - ry, c.y + ry, self.size.height);
        for y in ys {
            let dy = (y as f32 + 0.5 - c.y) / ry;
            for x in xs.clone() {
                let dx = (x as f32 + 0.5 - c.x) / rx;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, src: Color) {
        let bpp = self.format.bytes_per_pixel();
        let at = (y as usize * self.size.width as usize + x as usize) * bpp;
        let Some(texel) = self.texels.get_mut(at..at + bpp) else { return };

        let dst = self.format.decode(texel);
        let out = src.clamped().over(dst);
        self.format.encode(out, texel);
    }
}

/// Texel indices whose centers fall in `[min(a, b), max(a, b))`, clamped to `0..limit`.
fn center_span(a: f32, b: f32, limit: u32) -> Range<u32> {
    let lo = a.min(b) - 0.5;
    let hi = a.max(b) - 0.5;
    let max = limit as f32;
    // NaN casts to 0, which yields an empty range.
    let start = lo.ceil().clamp(0.0, max) as u32;
    let end = hi.ceil().clamp(0.0, max) as u32;
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Mat4, Rect};

    fn pixel_space(size: Extent) -> TransformUniform {
        // Logical units == pixels.
        let (w, h) = size.to_f32_clamped();
        TransformUniform {
            projection: Mat4::from_translation(-1.0, 1.0, 0.0)
                * Mat4::from_scale(2.0 / w, -2.0 / h, 1.0),
            scroll: [0.0, 0.0, 1.0, 0.0],
        }
    }

    fn canvas(texels: &mut [u8], size: Extent) -> Canvas<'_> {
        Canvas { size, format: PixelFormat::Rgba8Unorm, texels }
    }

    fn texel(texels: &[u8], size: Extent, x: u32, y: u32) -> [u8; 4] {
        let at = ((y * size.width + x) * 4) as usize;
        [texels[at], texels[at + 1], texels[at + 2], texels[at + 3]]
    }

    // ── spans ─────────────────────────────────────────────────────────────

    #[test]
    fn span_uses_pixel_centers() {
        assert_eq!(center_span(0.0, 10.0, 100), 0..10);
        assert_eq!(center_span(0.4, 0.6, 100), 0..1);
        assert_eq!(center_span(0.6, 1.4, 100), 1..1);
    }

    #[test]
    fn span_is_clamped_and_order_independent() {
        assert_eq!(center_span(120.0, -20.0, 100), 0..100);
        assert_eq!(center_span(f32::NAN, f32::NAN, 100), 0..0);
    }

    // ── passes ────────────────────────────────────────────────────────────

    #[test]
    fn clear_load_zeroes_garbage() {
        let size = Extent::new(4, 4);
        let mut texels = vec![0xCD; 64];
        canvas(&mut texels, size).run_pass(LoadAction::Clear, &pixel_space(size), &[]);
        assert!(texels.iter().all(|&b| b == 0));
    }

    #[test]
    fn rect_covers_exact_texels() {
        let size = Extent::new(8, 8);
        let mut texels = vec![0; 256];
        let draws = [DrawCmd::Rect { rect: Rect::new(2.0, 2.0, 3.0, 3.0), color: Color::RED }];
        canvas(&mut texels, size).run_pass(LoadAction::Preserve, &pixel_space(size), &draws);

        assert_eq!(texel(&texels, size, 2, 2), [255, 0, 0, 255]);
        assert_eq!(texel(&texels, size, 4, 4), [255, 0, 0, 255]);
        assert_eq!(texel(&texels, size, 5, 5), [0, 0, 0, 0]);
        assert_eq!(texel(&texels, size, 1, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn dab_is_round() {
        let size = Extent::new(16, 16);
        let mut texels = vec![0; 16 * 16 * 4];
        let draws = [DrawCmd::Dab { center: Vec2::new(8.0, 8.0), radius: 4.0, color: Color::WHITE }];
        canvas(&mut texels, size).run_pass(LoadAction::Preserve, &pixel_space(size), &draws);

        assert_eq!(texel(&texels, size, 8, 8), [255; 4]);
        assert_eq!(texel(&texels, size, 4, 8), [255; 4]);
        // Bounding-box corner lies outside the circle.
        assert_eq!(texel(&texels, size, 4, 4), [0; 4]);
    }

    #[test]
    fn translucent_draws_accumulate() {
        let size = Extent::new(2, 2);
        let mut texels = vec![0; 16];
        let faint = Color::from_straight(1.0, 1.0, 1.0, 0.4);
        let draws = [
            DrawCmd::Rect { rect: Rect::new(0.0, 0.0, 2.0, 2.0), color: faint },
            DrawCmd::Rect { rect: Rect::new(0.0, 0.0, 2.0, 2.0), color: faint },
        ];
        canvas(&mut texels, size).run_pass(LoadAction::Preserve, &pixel_space(size), &draws);
        // 0.4 + 0.4 * 0.6 = 0.64
        assert_eq!(texel(&texels, size, 0, 0), [163, 163, 163, 163]);
    }
}
