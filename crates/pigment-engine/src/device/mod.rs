//! GPU device collaborators.
//!
//! A render target talks to the host graphics runtime only through
//! [`GpuDevice`]:
//! - texture allocation and synchronous zero fill
//! - command-buffer creation, pass encoding and submission
//! - readback of committed contents
//!
//! Two implementations ship with the crate: [`WgpuDevice`] (headless wgpu) and
//! [`SoftwareDevice`] (CPU reference with deferred submission).

mod error;
mod format;
mod gpu;
mod init;
mod software;

pub use error::TargetError;
pub use format::{PixelData, PixelFormat};
pub use gpu::WgpuDevice;
pub use init::DeviceInit;
pub use software::{DeviceStats, SoftCommandBuffer, SoftTexture, SoftwareDevice, SoftwareLimits};

use crate::coords::Extent;
use crate::render::PassDesc;

/// Device/context supplied by the host graphics runtime.
///
/// Handles are owned values: dropping a `Texture` releases it, and a
/// `CommandBuffer` is consumed by [`submit`](Self::submit).
pub trait GpuDevice {
    /// Texture handle backing a color buffer.
    type Texture;
    /// Recording command buffer; passes are encoded into it until submission.
    type CommandBuffer;

    /// Largest width or height accepted by [`create_texture`](Self::create_texture).
    fn max_texture_dimension(&self) -> u32;

    /// Allocates a render-attachment texture. Contents are undefined.
    fn create_texture(
        &mut self,
        size: Extent,
        format: PixelFormat,
    ) -> Result<Self::Texture, TargetError>;

    /// Zeroes every texel and waits until the fill has executed.
    fn fill_zero(&mut self, texture: &Self::Texture) -> Result<(), TargetError>;

    fn create_command_buffer(&mut self) -> Result<Self::CommandBuffer, TargetError>;

    /// Records one render pass. Nothing executes before [`submit`](Self::submit).
    fn encode_pass(&mut self, commands: &mut Self::CommandBuffer, pass: PassDesc<'_, Self::Texture>);

    /// Queues every recorded pass for execution, in recording order.
    fn submit(&mut self, commands: Self::CommandBuffer);

    /// Copies the executed contents of `texture` back to the CPU.
    fn read_pixels(
        &mut self,
        texture: &Self::Texture,
        size: Extent,
        format: PixelFormat,
    ) -> Result<PixelData, TargetError>;
}
