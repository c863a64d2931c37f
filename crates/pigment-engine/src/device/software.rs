use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::Extent;
use crate::render::raster::Canvas;
use crate::render::{DrawCmd, LoadAction, PassDesc, TransformUniform};

use super::{GpuDevice, PixelData, PixelFormat, TargetError};

/// Byte written into fresh allocations. Real drivers may hand out
/// uninitialized memory; the poison makes a missing zero fill visible.
const UNINIT_POISON: u8 = 0xCD;

/// Limits enforced by [`SoftwareDevice`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SoftwareLimits {
    pub max_texture_dimension: u32,
}

impl Default for SoftwareLimits {
    fn default() -> Self {
        // wgpu's default `max_texture_dimension_2d`.
        Self { max_texture_dimension: 8192 }
    }
}

/// Counters for device traffic, mainly for tests and diagnostics.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DeviceStats {
    pub textures_created: u64,
    pub zero_fills: u64,
    pub command_buffers_created: u64,
    pub submissions: u64,
    pub passes_executed: u64,
}

/// CPU device with GPU-like deferred execution.
///
/// Passes are recorded into a [`SoftCommandBuffer`] and only touch texels when
/// the buffer is submitted. Textures are shared handles so a recorded pass can
/// keep its attachment alive, the same way a GPU command buffer does.
#[derive(Debug, Default)]
pub struct SoftwareDevice {
    limits: SoftwareLimits,
    stats: DeviceStats,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SoftwareLimits) -> Self {
        Self { limits, stats: DeviceStats::default() }
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }
}

/// Texture handle of [`SoftwareDevice`].
#[derive(Debug, Clone)]
pub struct SoftTexture {
    texels: Rc<RefCell<Vec<u8>>>,
    size: Extent,
    format: PixelFormat,
}

impl SoftTexture {
    pub fn size(&self) -> Extent {
        self.size
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// `true` when both handles refer to the same allocation.
    pub fn same_allocation(&self, other: &SoftTexture) -> bool {
        Rc::ptr_eq(&self.texels, &other.texels)
    }
}

#[derive(Debug)]
struct RecordedPass {
    target: SoftTexture,
    load: LoadAction,
    transform: TransformUniform,
    draws: Vec<DrawCmd>,
}

/// Command buffer of [`SoftwareDevice`].
#[derive(Debug, Default)]
pub struct SoftCommandBuffer {
    passes: Vec<RecordedPass>,
}

impl SoftCommandBuffer {
    /// Number of passes waiting for submission.
    pub fn pending_passes(&self) -> usize {
        self.passes.len()
    }
}

impl GpuDevice for SoftwareDevice {
    type Texture = SoftTexture;
    type CommandBuffer = SoftCommandBuffer;

    fn max_texture_dimension(&self) -> u32 {
        self.limits.max_texture_dimension
    }

    fn create_texture(&mut self, size: Extent, format: PixelFormat) -> Result<SoftTexture, TargetError> {
        let max = self.max_texture_dimension();
        if size.is_degenerate() || size.width > max || size.height > max {
            return Err(TargetError::allocation(format!(
                "{}x{} outside device range 1..={max}",
                size.width, size.height
            )));
        }

        let len = usize::try_from(size.area())
            .ok()
            .and_then(|texels| texels.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| TargetError::allocation("texture does not fit in memory"))?;

        self.stats.textures_created += 1;
        Ok(SoftTexture {
            texels: Rc::new(RefCell::new(vec![UNINIT_POISON; len])),
            size,
            format,
        })
    }

    fn fill_zero(&mut self, texture: &SoftTexture) -> Result<(), TargetError> {
        texture.texels.borrow_mut().fill(0);
        self.stats.zero_fills += 1;
        Ok(())
    }

    fn create_command_buffer(&mut self) -> Result<SoftCommandBuffer, TargetError> {
        self.stats.command_buffers_created += 1;
        Ok(SoftCommandBuffer::default())
    }

    fn encode_pass(&mut self, commands: &mut SoftCommandBuffer, pass: PassDesc<'_, SoftTexture>) {
        commands.passes.push(RecordedPass {
            target: pass.target.clone(),
            load: pass.load,
            transform: pass.transform,
            draws: pass.draws.to_vec(),
        });
    }

    fn submit(&mut self, commands: SoftCommandBuffer) {
        self.stats.submissions += 1;
        for pass in commands.passes {
            let mut texels = pass.target.texels.borrow_mut();
            let mut canvas = Canvas {
                size: pass.target.size,
                format: pass.target.format,
                texels: texels.as_mut_slice(),
            };
            canvas.run_pass(pass.load, &pass.transform, &pass.draws);
            self.stats.passes_executed += 1;
        }
    }

    fn read_pixels(
        &mut self,
        texture: &SoftTexture,
        size: Extent,
        format: PixelFormat,
    ) -> Result<PixelData, TargetError> {
        if size != texture.size || format != texture.format {
            return Err(TargetError::readback(format!(
                "requested {size:?}/{format:?}, texture is {:?}/{:?}",
                texture.size, texture.format
            )));
        }
        Ok(PixelData {
            size,
            format,
            bytes: texture.texels.borrow().clone(),
        })
    }
}
