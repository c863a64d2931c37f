use crate::coords::Extent;
use crate::paint::Color;

/// Channel layout of a color buffer. Every variant is 8 bits per channel.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    #[default]
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    #[inline]
    pub const fn is_srgb(self) -> bool {
        matches!(self, Self::Rgba8UnormSrgb | Self::Bgra8UnormSrgb)
    }

    #[inline]
    pub const fn is_bgra(self) -> bool {
        matches!(self, Self::Bgra8Unorm | Self::Bgra8UnormSrgb)
    }

    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            Self::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            Self::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
        }
    }

    /// Reorders a stored texel into `[r, g, b, a]`.
    #[inline]
    pub fn to_rgba(self, texel: [u8; 4]) -> [u8; 4] {
        if self.is_bgra() {
            [texel[2], texel[1], texel[0], texel[3]]
        } else {
            texel
        }
    }

    /// Decodes a stored texel into a linear premultiplied color.
    pub(crate) fn decode(self, texel: &[u8]) -> Color {
        let [r, g, b, a] = self.to_rgba([texel[0], texel[1], texel[2], texel[3]]);
        let channel = |v: u8| {
            let v = f32::from(v) / 255.0;
            if self.is_srgb() { srgb_to_linear(v) } else { v }
        };
        Color::from_premul(channel(r), channel(g), channel(b), f32::from(a) / 255.0)
    }

    /// Encodes a linear premultiplied color into `texel` (same rules as GPU
    /// render-target writes: sRGB formats encode RGB, alpha stays linear).
    pub(crate) fn encode(self, color: Color, texel: &mut [u8]) {
        let channel = |v: f32| {
            let v = v.clamp(0.0, 1.0);
            let v = if self.is_srgb() { linear_to_srgb(v) } else { v };
            (v * 255.0).round() as u8
        };
        let rgba = [channel(color.r), channel(color.g), channel(color.b), channel_linear(color.a)];
        // to_rgba is its own inverse.
        texel[..4].copy_from_slice(&self.to_rgba(rgba));
    }
}

fn channel_linear(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 { v / 12.92 } else { ((v + 0.055) / 1.055).powf(2.4) }
}

fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 { v * 12.92 } else { 1.055 * v.powf(1.0 / 2.4) - 0.055 }
}

/// CPU copy of a color buffer: tightly packed rows in the format's native
/// channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelData {
    pub size: Extent,
    pub format: PixelFormat,
    pub bytes: Vec<u8>,
}

impl PixelData {
    /// Texel at `(x, y)` as `[r, g, b, a]`; `None` outside the buffer.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let at = (y as usize * self.size.width as usize + x as usize) * bpp;
        let texel = self.bytes.get(at..at + bpp)?;
        Some(self.format.to_rgba([texel[0], texel[1], texel[2], texel[3]]))
    }

    /// `true` when every byte is zero (transparent black everywhere).
    pub fn is_zeroed(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// Number of texels with non-zero alpha.
    pub fn covered_texels(&self) -> usize {
        self.bytes
            .chunks_exact(self.format.bytes_per_pixel())
            .filter(|t| t[3] != 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_round_trips_through_rgba_order() {
        let mut texel = [0u8; 4];
        PixelFormat::Bgra8Unorm.encode(Color::RED, &mut texel);
        assert_eq!(texel, [0, 0, 255, 255]);
        assert_eq!(PixelFormat::Bgra8Unorm.to_rgba(texel), [255, 0, 0, 255]);
    }

    #[test]
    fn srgb_encodes_mid_grey_brighter() {
        let mut texel = [0u8; 4];
        PixelFormat::Rgba8UnormSrgb.encode(Color::from_premul(0.5, 0.5, 0.5, 1.0), &mut texel);
        // linear 0.5 ~ sRGB 188
        assert_eq!(texel, [188, 188, 188, 255]);
        let back = PixelFormat::Rgba8UnormSrgb.decode(&texel);
        assert!((back.r - 0.5).abs() < 0.01);
    }

    #[test]
    fn rgba_at_is_bounds_checked() {
        let data = PixelData {
            size: Extent::new(2, 1),
            format: PixelFormat::Rgba8Unorm,
            bytes: vec![0, 0, 0, 0, 1, 2, 3, 4],
        };
        assert_eq!(data.rgba_at(1, 0), Some([1, 2, 3, 4]));
        assert_eq!(data.rgba_at(2, 0), None);
        assert_eq!(data.covered_texels(), 1);
        assert!(!data.is_zeroed());
    }
}
