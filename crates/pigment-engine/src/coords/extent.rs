/// Pixel dimensions of a color buffer or drawable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either dimension is zero. Such a size can never back a texture.
    #[inline]
    pub const fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width and height as floats, each clamped to at least one unit.
    #[inline]
    pub fn to_f32_clamped(self) -> (f32, f32) {
        ((self.width as f32).max(1.0), (self.height as f32).max(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_when_any_side_is_zero() {
        assert!(Extent::new(0, 10).is_degenerate());
        assert!(Extent::new(10, 0).is_degenerate());
        assert!(!Extent::new(1, 1).is_degenerate());
    }

    #[test]
    fn area_does_not_overflow_u32() {
        assert_eq!(Extent::new(u32::MAX, 2).area(), u32::MAX as u64 * 2);
    }

    #[test]
    fn clamped_floats_never_zero() {
        assert_eq!(Extent::new(0, 0).to_f32_clamped(), (1.0, 1.0));
        assert_eq!(Extent::new(640, 480).to_f32_clamped(), (640.0, 480.0));
    }
}
