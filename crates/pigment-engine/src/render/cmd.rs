use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// Device-agnostic draw command recorded by a `DrawEncoder`.
///
/// Extending:
/// - add a variant here
/// - teach `render::shapes` (wgpu) and `render::raster` (software) to draw it
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Solid axis-aligned rectangle.
    Rect { rect: Rect, color: Color },
    /// Round brush stamp. Strokes are sequences of dabs.
    Dab { center: Vec2, radius: f32, color: Color },
}

impl DrawCmd {
    /// Logical-space bounds of the command.
    pub fn bounds(&self) -> Rect {
        match *self {
            DrawCmd::Rect { rect, .. } => rect.normalized(),
            DrawCmd::Dab { center, radius, .. } => Rect::around_circle(center, radius),
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            DrawCmd::Rect { color, .. } | DrawCmd::Dab { color, .. } => color,
        }
    }

    /// `false` for commands that cannot produce pixels (empty or non-finite geometry).
    pub fn is_drawable(&self) -> bool {
        let geometry_ok = match *self {
            DrawCmd::Rect { rect, .. } => rect.is_finite() && !rect.normalized().is_empty(),
            DrawCmd::Dab { center, radius, .. } => {
                center.is_finite() && radius.is_finite() && radius > 0.0
            }
        };
        geometry_ok && self.color().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dab_bounds_cover_circle() {
        let cmd = DrawCmd::Dab { center: Vec2::new(10.0, 10.0), radius: 3.0, color: Color::RED };
        assert_eq!(cmd.bounds(), Rect::new(7.0, 7.0, 6.0, 6.0));
    }

    #[test]
    fn negative_rect_is_drawable_after_normalizing() {
        let cmd = DrawCmd::Rect { rect: Rect::new(10.0, 10.0, -5.0, -5.0), color: Color::RED };
        assert!(cmd.is_drawable());
        assert_eq!(cmd.bounds(), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn degenerate_commands_are_rejected() {
        let empty = DrawCmd::Rect { rect: Rect::new(0.0, 0.0, 0.0, 4.0), color: Color::RED };
        let zero_dab = DrawCmd::Dab { center: Vec2::zero(), radius: 0.0, color: Color::RED };
        let nan_color = DrawCmd::Dab {
            center: Vec2::zero(),
            radius: 1.0,
            color: Color::from_premul(f32::NAN, 0.0, 0.0, 1.0),
        };
        assert!(!empty.is_drawable());
        assert!(!zero_dab.is_drawable());
        assert!(!nan_color.is_drawable());
    }
}
