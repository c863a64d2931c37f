use crate::coords::{Extent, Mat4, Vec2};
use crate::device::TargetError;
use crate::render::TransformUniform;

/// Inputs of the transform pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformInputs {
    /// Display/device scale. Affects projection and scroll transform.
    pub scale: f32,
    /// Content magnification. Affects the projection only.
    pub zoom: f32,
    /// Pan offset in logical points.
    pub content_offset: Vec2,
    /// Drawable size in pixels.
    pub drawable_size: Extent,
    /// Device pixels per logical point, supplied by the host.
    pub native_scale: f32,
}

impl Default for TransformInputs {
    fn default() -> Self {
        Self {
            scale: 1.0,
            zoom: 1.0,
            content_offset: Vec2::zero(),
            drawable_size: Extent::new(0, 0),
            native_scale: 1.0,
        }
    }
}

impl TransformInputs {
    /// Rejects non-positive or non-finite factors and non-finite offsets.
    pub fn validate(&self) -> Result<(), TargetError> {
        let factors = [
            ("scale", self.scale),
            ("zoom", self.zoom),
            ("native_scale", self.native_scale),
        ];
        for (name, value) in factors {
            if !(value.is_finite() && value > 0.0) {
                return Err(TargetError::InvalidParameter { name, value });
            }
        }
        if !self.content_offset.is_finite() {
            let value = if self.content_offset.x.is_finite() {
                self.content_offset.y
            } else {
                self.content_offset.x
            };
            return Err(TargetError::InvalidParameter { name: "content_offset", value });
        }
        Ok(())
    }
}

/// Pan offset (device pixels) and scale, as consumed by the vertex stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollTransform {
    pub offset: Vec2,
    pub scale: f32,
}

impl ScrollTransform {
    /// Packs into the 16-byte uniform layout `[offset_x, offset_y, scale, 0]`.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.offset.x, self.offset.y, self.scale, 0.0]
    }
}

/// Transform inputs plus the two outputs derived from them.
///
/// Outputs are recomputed inside [`update`](Self::update); there is no lazy
/// or deferred path, so a draw can never observe a stale transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    inputs: TransformInputs,
    projection: Mat4,
    scroll: ScrollTransform,
}

impl TransformState {
    pub fn new(inputs: TransformInputs) -> Result<Self, TargetError> {
        inputs.validate()?;
        Ok(Self {
            inputs,
            projection: projection_matrix(&inputs),
            scroll: scroll_transform(&inputs),
        })
    }

    /// Replaces every input and recomputes both outputs.
    ///
    /// On error nothing changes.
    pub fn update(&mut self, inputs: TransformInputs) -> Result<(), TargetError> {
        *self = Self::new(inputs)?;
        Ok(())
    }

    #[inline]
    pub fn inputs(&self) -> TransformInputs {
        self.inputs
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.inputs.scale
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.inputs.zoom
    }

    #[inline]
    pub fn content_offset(&self) -> Vec2 {
        self.inputs.content_offset
    }

    #[inline]
    pub fn drawable_size(&self) -> Extent {
        self.inputs.drawable_size
    }

    #[inline]
    pub fn native_scale(&self) -> f32 {
        self.inputs.native_scale
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn scroll(&self) -> ScrollTransform {
        self.scroll
    }

    /// Shader-ready snapshot of both outputs.
    #[inline]
    pub fn uniform(&self) -> TransformUniform {
        TransformUniform {
            projection: self.projection,
            scroll: self.scroll.to_array(),
        }
    }
}

impl Default for TransformState {
    fn default() -> Self {
        let inputs = TransformInputs::default();
        Self {
            inputs,
            projection: projection_matrix(&inputs),
            scroll: scroll_transform(&inputs),
        }
    }
}

/// Scales X by `2 * zoom / (scale * width)` and Y by the negated height
/// equivalent, then translates by `(-1, +1)` so the drawable's top-left lands
/// on the NDC corner.
fn projection_matrix(inputs: &TransformInputs) -> Mat4 {
    let zoom_uniform = 2.0 * inputs.zoom / inputs.scale;
    let (width, height) = inputs.drawable_size.to_f32_clamped();
    Mat4::from_translation(-1.0, 1.0, 0.0)
        * Mat4::from_scale(zoom_uniform / width, -zoom_uniform / height, 1.0)
}

fn scroll_transform(inputs: &TransformInputs) -> ScrollTransform {
    ScrollTransform {
        offset: inputs.content_offset * inputs.native_scale,
        scale: inputs.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn inputs(scale: f32, zoom: f32, w: u32, h: u32) -> TransformInputs {
        TransformInputs {
            scale,
            zoom,
            drawable_size: Extent::new(w, h),
            ..TransformInputs::default()
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPS * a.abs().max(b.abs()).max(1.0)
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_matches_formula_across_inputs() {
        for scale in [0.25, 0.5, 1.0, 2.0, 3.0] {
            for zoom in [0.5, 1.0, 4.0] {
                for (w, h) in [(100, 100), (640, 480), (1, 4096)] {
                    let t = TransformState::new(inputs(scale, zoom, w, h)).unwrap();
                    let p = t.projection();
                    assert!(approx(p.x_scale(), 2.0 * zoom / (scale * w as f32)));
                    assert!(approx(p.y_scale(), -2.0 * zoom / (scale * h as f32)));
                    assert_eq!(p.translation(), Vec2::new(-1.0, 1.0));
                }
            }
        }
    }

    #[test]
    fn projection_tracks_scale_changes() {
        let mut t = TransformState::new(inputs(2.0, 1.0, 100, 100)).unwrap();
        let at_two = t.projection();
        assert!(approx(at_two.x_scale(), 0.01));

        t.update(inputs(1.0, 1.0, 100, 100)).unwrap();
        assert_ne!(t.projection(), at_two);
        assert!(approx(t.projection().x_scale(), 0.02));
        assert!(approx(t.projection().y_scale(), -0.02));
    }

    #[test]
    fn top_left_maps_to_ndc_corner() {
        let t = TransformState::new(inputs(1.0, 1.0, 100, 50)).unwrap();
        let u = t.uniform();
        assert_eq!(u.to_ndc(Vec2::zero()), Vec2::new(-1.0, 1.0));
        let far = u.to_ndc(Vec2::new(100.0, 50.0));
        assert!(approx(far.x, 1.0) && approx(far.y, -1.0));
    }

    #[test]
    fn degenerate_drawable_does_not_divide_by_zero() {
        let t = TransformState::new(inputs(1.0, 1.0, 0, 0)).unwrap();
        assert!(t.projection().x_scale().is_finite());
        assert!(t.projection().y_scale().is_finite());
    }

    // ── scroll ────────────────────────────────────────────────────────────

    #[test]
    fn scroll_scales_offset_by_native_density() {
        let t = TransformState::new(TransformInputs {
            scale: 1.5,
            content_offset: Vec2::new(10.0, -4.0),
            native_scale: 2.0,
            ..TransformInputs::default()
        })
        .unwrap();
        assert_eq!(t.scroll().offset, Vec2::new(20.0, -8.0));
        assert_eq!(t.scroll().to_array(), [20.0, -8.0, 1.5, 0.0]);
    }

    #[test]
    fn zoom_leaves_scroll_untouched() {
        let base = TransformInputs { content_offset: Vec2::new(3.0, 3.0), ..inputs(2.0, 1.0, 64, 64) };
        let mut t = TransformState::new(base).unwrap();
        let scroll = t.scroll();
        let projection = t.projection();

        t.update(TransformInputs { zoom: 8.0, ..base }).unwrap();
        assert_eq!(t.scroll(), scroll);
        assert_ne!(t.projection(), projection);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn non_positive_factors_are_rejected_without_side_effects() {
        let mut t = TransformState::new(inputs(2.0, 3.0, 10, 10)).unwrap();
        let before = t;

        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = t.update(inputs(bad, 1.0, 10, 10)).unwrap_err();
            assert!(matches!(err, TargetError::InvalidParameter { name: "scale", .. }));
            let err = t.update(inputs(1.0, bad, 10, 10)).unwrap_err();
            assert!(matches!(err, TargetError::InvalidParameter { name: "zoom", .. }));
        }
        assert_eq!(t, before);
    }

    #[test]
    fn non_finite_offset_is_rejected() {
        let bad = TransformInputs {
            content_offset: Vec2::new(0.0, f32::NAN),
            ..TransformInputs::default()
        };
        let err = TransformState::new(bad).unwrap_err();
        assert!(matches!(err, TargetError::InvalidParameter { name: "content_offset", .. }));
    }
}
