use crate::coords::Extent;
use crate::device::{GpuDevice, PixelData, PixelFormat, TargetError};

/// Device texture that is guaranteed zeroed before anyone can see it.
///
/// Device allocations may return uninitialized memory, so [`allocate`](Self::allocate)
/// issues an explicit zero fill and waits for it before returning. A
/// `ColorBuffer` whose fill failed is never constructed. Dropping the buffer
/// releases the texture.
pub struct ColorBuffer<D: GpuDevice> {
    texture: D::Texture,
    size: Extent,
    format: PixelFormat,
}

impl<D: GpuDevice> ColorBuffer<D> {
    /// Allocates and zero-fills a texture.
    ///
    /// Fails with `AllocationFailure` for a zero-area size or when the device
    /// cannot provide the texture.
    pub fn allocate(device: &mut D, size: Extent, format: PixelFormat) -> Result<Self, TargetError> {
        if size.is_degenerate() {
            return Err(TargetError::allocation(format!(
                "zero-area color buffer ({}x{})",
                size.width, size.height
            )));
        }

        let texture = device.create_texture(size, format)?;
        device.fill_zero(&texture)?;
        log::debug!("allocated {}x{} {format:?} color buffer", size.width, size.height);

        Ok(Self {
            texture,
            size,
            format,
        })
    }

    #[inline]
    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    #[inline]
    pub fn size(&self) -> Extent {
        self.size
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Copies the executed contents back to the CPU.
    pub fn read_pixels(&self, device: &mut D) -> Result<PixelData, TargetError> {
        device.read_pixels(&self.texture, self.size, self.format)
    }
}

impl<D: GpuDevice> Drop for ColorBuffer<D> {
    fn drop(&mut self) {
        log::trace!("releasing {}x{} color buffer", self.size.width, self.size.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{SoftwareDevice, SoftwareLimits};

    #[test]
    fn allocation_is_zeroed_despite_poisoned_memory() {
        let mut device = SoftwareDevice::new();
        let buffer = ColorBuffer::allocate(&mut device, Extent::new(16, 8), PixelFormat::Bgra8Unorm).unwrap();

        assert_eq!(buffer.size(), Extent::new(16, 8));
        assert_eq!(buffer.format(), PixelFormat::Bgra8Unorm);
        let pixels = buffer.read_pixels(&mut device).unwrap();
        assert_eq!(pixels.bytes.len(), 16 * 8 * 4);
        assert!(pixels.is_zeroed());
        assert_eq!(device.stats().zero_fills, 1);
    }

    #[test]
    fn zero_area_is_rejected_before_touching_the_device() {
        let mut device = SoftwareDevice::new();
        for size in [Extent::new(0, 10), Extent::new(10, 0)] {
            let err = ColorBuffer::allocate(&mut device, size, PixelFormat::Rgba8Unorm).err();
            assert!(matches!(err, Some(TargetError::AllocationFailure { .. })));
        }
        assert_eq!(device.stats().textures_created, 0);
    }

    #[test]
    fn device_failure_propagates() {
        let mut device = SoftwareDevice::with_limits(SoftwareLimits { max_texture_dimension: 32 });
        let err = ColorBuffer::allocate(&mut device, Extent::new(64, 64), PixelFormat::Rgba8Unorm).err();
        assert!(matches!(err, Some(TargetError::AllocationFailure { .. })));
        assert_eq!(device.stats().zero_fills, 0);
    }
}
