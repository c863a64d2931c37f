use crate::device::{GpuDevice, TargetError};
use crate::render::LoadAction;

use super::{ColorBuffer, DrawEncoder, TransformState};

/// One in-flight batch of render passes.
///
/// Invariants:
/// - at most one command buffer is open; opening again reuses it
/// - commit submits every recorded pass before the handle is released
/// - after a pass is recorded or a batch is committed, the attachment loads
///   with `Preserve` until [`reset_load_action`](Self::reset_load_action)
pub struct CommandSession<D: GpuDevice> {
    commands: Option<D::CommandBuffer>,
    load_action: LoadAction,
    pending_passes: usize,
}

impl<D: GpuDevice> Default for CommandSession<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GpuDevice> CommandSession<D> {
    /// Closed session whose first pass clears the attachment.
    pub fn new() -> Self {
        Self {
            commands: None,
            load_action: LoadAction::Clear,
            pending_passes: 0,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.commands.is_some()
    }

    /// Load action the next pass will use.
    #[inline]
    pub fn load_action(&self) -> LoadAction {
        self.load_action
    }

    #[inline]
    pub fn reset_load_action(&mut self, action: LoadAction) {
        self.load_action = action;
    }

    /// Passes recorded since the session was opened.
    #[inline]
    pub fn pending_passes(&self) -> usize {
        self.pending_passes
    }

    /// Opens a command buffer unless one is already open.
    pub fn begin_if_needed(&mut self, device: &mut D) -> Result<(), TargetError> {
        if self.commands.is_none() {
            self.commands = Some(device.create_command_buffer()?);
            self.pending_passes = 0;
            log::trace!("command session opened (load {:?})", self.load_action);
        }
        Ok(())
    }

    /// Encoder for one pass against `attachment`.
    ///
    /// `None` when the session is closed or no attachment is configured.
    pub fn encoder<'a>(
        &'a mut self,
        device: &'a mut D,
        attachment: Option<&'a ColorBuffer<D>>,
        transform: &TransformState,
    ) -> Option<DrawEncoder<'a, D>> {
        let attachment = attachment?;
        let commands = self.commands.as_mut()?;
        let load = std::mem::replace(&mut self.load_action, LoadAction::Preserve);
        Some(DrawEncoder::new(
            device,
            commands,
            attachment,
            load,
            transform.uniform(),
            &mut self.pending_passes,
        ))
    }

    /// Submits the open batch and closes the session. No-op when closed.
    ///
    /// Returns `true` when a batch was submitted.
    pub fn commit(&mut self, device: &mut D) -> bool {
        let Some(commands) = self.commands.take() else { return false };
        device.submit(commands);
        log::trace!("command session committed ({} passes)", self.pending_passes);
        self.pending_passes = 0;
        self.load_action = LoadAction::Preserve;
        true
    }

    /// Drops the open batch without submitting it.
    pub(crate) fn discard(&mut self) -> usize {
        let discarded = if self.commands.take().is_some() { self.pending_passes } else { 0 };
        self.pending_passes = 0;
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Extent, Rect};
    use crate::device::{PixelFormat, SoftwareDevice};
    use crate::paint::Color;

    fn setup() -> (SoftwareDevice, ColorBuffer<SoftwareDevice>, TransformState) {
        let mut device = SoftwareDevice::new();
        let size = Extent::new(8, 8);
        let buffer = ColorBuffer::allocate(&mut device, size, PixelFormat::Rgba8Unorm).ok().unwrap();
        let transform = TransformState::new(crate::target::TransformInputs {
            drawable_size: size,
            ..Default::default()
        })
        .unwrap();
        (device, buffer, transform)
    }

    #[test]
    fn begin_is_idempotent() {
        let (mut device, _buffer, _t) = setup();
        let mut session = CommandSession::new();
        session.begin_if_needed(&mut device).unwrap();
        session.begin_if_needed(&mut device).unwrap();
        assert!(session.is_open());
        assert_eq!(device.stats().command_buffers_created, 1);
    }

    #[test]
    fn encoder_requires_open_session_and_attachment() {
        let (mut device, buffer, t) = setup();
        let mut session = CommandSession::new();
        assert!(session.encoder(&mut device, Some(&buffer), &t).is_none());

        session.begin_if_needed(&mut device).unwrap();
        assert!(session.encoder(&mut device, None, &t).is_none());
        // A refused encoder must not consume the pending clear.
        assert_eq!(session.load_action(), LoadAction::Clear);
        assert!(session.encoder(&mut device, Some(&buffer), &t).is_some());
    }

    #[test]
    fn first_pass_clears_then_preserves() {
        let (mut device, buffer, t) = setup();
        let mut session = CommandSession::new();
        session.begin_if_needed(&mut device).unwrap();

        let first = session.encoder(&mut device, Some(&buffer), &t).unwrap();
        assert_eq!(first.load_action(), LoadAction::Clear);
        first.end();
        let second = session.encoder(&mut device, Some(&buffer), &t).unwrap();
        assert_eq!(second.load_action(), LoadAction::Preserve);
        second.end();
        assert_eq!(session.pending_passes(), 2);
    }

    #[test]
    fn commit_submits_everything_and_closes() {
        let (mut device, buffer, t) = setup();
        let mut session = CommandSession::new();
        assert!(!session.commit(&mut device));

        session.begin_if_needed(&mut device).unwrap();
        for i in 0..3 {
            let mut enc = session.encoder(&mut device, Some(&buffer), &t).unwrap();
            enc.fill_rect(Rect::new(i as f32, 0.0, 1.0, 1.0), Color::RED);
        }
        assert!(session.commit(&mut device));

        assert!(!session.is_open());
        assert_eq!(session.pending_passes(), 0);
        assert_eq!(session.load_action(), LoadAction::Preserve);
        assert_eq!(device.stats().submissions, 1);
        assert_eq!(device.stats().passes_executed, 3);
        assert_eq!(buffer.read_pixels(&mut device).unwrap().covered_texels(), 3);

        // The next batch starts empty.
        session.begin_if_needed(&mut device).unwrap();
        assert_eq!(session.pending_passes(), 0);
    }

    #[test]
    fn discard_drops_pending_passes_unsubmitted() {
        let (mut device, buffer, t) = setup();
        let mut session = CommandSession::new();
        assert_eq!(session.discard(), 0);

        session.begin_if_needed(&mut device).unwrap();
        let mut enc = session.encoder(&mut device, Some(&buffer), &t).unwrap();
        enc.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED);
        enc.end();

        assert_eq!(session.discard(), 1);
        assert!(!session.is_open());
        assert!(!session.commit(&mut device));
        assert_eq!(device.stats().submissions, 0);
        assert!(buffer.read_pixels(&mut device).unwrap().is_zeroed());
    }

    #[test]
    fn reset_load_action_applies_to_next_pass() {
        let (mut device, buffer, t) = setup();
        let mut session = CommandSession::new();
        session.begin_if_needed(&mut device).unwrap();
        session.encoder(&mut device, Some(&buffer), &t).unwrap().end();
        session.commit(&mut device);

        session.reset_load_action(LoadAction::Clear);
        session.begin_if_needed(&mut device).unwrap();
        let enc = session.encoder(&mut device, Some(&buffer), &t).unwrap();
        assert_eq!(enc.load_action(), LoadAction::Clear);
    }
}
