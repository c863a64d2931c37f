use crate::coords::{Rect, Vec2};
use crate::device::GpuDevice;
use crate::paint::Color;
use crate::render::{DrawCmd, LoadAction, PassDesc, TransformUniform};

use super::ColorBuffer;

/// Records draws for one render pass.
///
/// The pass is encoded into the session's command buffer when the encoder is
/// ended or dropped. Nothing reaches the color buffer before the session is
/// committed.
pub struct DrawEncoder<'a, D: GpuDevice> {
    device: &'a mut D,
    commands: &'a mut D::CommandBuffer,
    attachment: &'a ColorBuffer<D>,
    load: LoadAction,
    transform: TransformUniform,
    draws: Vec<DrawCmd>,
    encoded_passes: &'a mut usize,
}

impl<'a, D: GpuDevice> DrawEncoder<'a, D> {
    pub(super) fn new(
        device: &'a mut D,
        commands: &'a mut D::CommandBuffer,
        attachment: &'a ColorBuffer<D>,
        load: LoadAction,
        transform: TransformUniform,
        encoded_passes: &'a mut usize,
    ) -> Self {
        Self {
            device,
            commands,
            attachment,
            load,
            transform,
            draws: Vec::new(),
            encoded_passes,
        }
    }

    /// Axis-aligned rectangle in logical points.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> &mut Self {
        self.draw(DrawCmd::Rect { rect, color })
    }

    /// Round brush dab in logical points.
    pub fn dab(&mut self, center: Vec2, radius: f32, color: Color) -> &mut Self {
        self.draw(DrawCmd::Dab { center, radius, color })
    }

    pub fn draw(&mut self, cmd: DrawCmd) -> &mut Self {
        if cmd.is_drawable() {
            self.draws.push(cmd);
        } else {
            log::trace!("skipping undrawable {cmd:?}");
        }
        self
    }

    #[inline]
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// How the attachment's prior contents are treated by this pass.
    #[inline]
    pub fn load_action(&self) -> LoadAction {
        self.load
    }

    /// Transform snapshot taken when the encoder was created.
    #[inline]
    pub fn transform(&self) -> &TransformUniform {
        &self.transform
    }

    /// Encodes the pass. Equivalent to dropping the encoder.
    pub fn end(self) {}
}

impl<D: GpuDevice> Drop for DrawEncoder<'_, D> {
    fn drop(&mut self) {
        let pass = PassDesc {
            target: self.attachment.texture(),
            size: self.attachment.size(),
            format: self.attachment.format(),
            load: self.load,
            transform: self.transform,
            draws: &self.draws,
        };
        self.device.encode_pass(self.commands, pass);
        *self.encoded_passes += 1;
    }
}
