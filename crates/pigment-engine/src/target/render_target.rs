use crate::coords::{Extent, Vec2};
use crate::device::{GpuDevice, PixelData, PixelFormat, TargetError};
use crate::render::LoadAction;

use super::{ColorBuffer, CommandSession, DrawEncoder, TargetConfig, TransformInputs, TransformState};

/// Lifecycle of a [`RenderTarget`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetState {
    /// No color buffer (degenerate size or failed allocation).
    Empty,
    /// Buffer present, no open session.
    Ready,
    /// A session is open and recording passes.
    Recording,
}

/// Offscreen drawing surface backed by a device texture.
///
/// Owns the device, the color buffer, the command session and the transform.
/// Draws are recorded through [`request_encoder`](Self::request_encoder) and
/// become visible in the buffer only after [`commit`](Self::commit).
pub struct RenderTarget<D: GpuDevice> {
    device: D,
    buffer: Option<ColorBuffer<D>>,
    session: CommandSession<D>,
    transform: TransformState,
    format: PixelFormat,
    size: Extent,
}

impl<D: GpuDevice> RenderTarget<D> {
    pub fn new(device: D, size: Extent, format: PixelFormat) -> Self {
        Self::with_config(device, TargetConfig { size, format, ..Default::default() })
    }

    /// Builds a target and allocates its zeroed color buffer.
    ///
    /// Allocation failures are logged and leave the target `Empty`; an invalid
    /// `native_scale` falls back to 1.
    pub fn with_config(device: D, config: TargetConfig) -> Self {
        let mut inputs = TransformInputs {
            drawable_size: config.size,
            native_scale: config.native_scale,
            ..Default::default()
        };
        let transform = match TransformState::new(inputs) {
            Ok(transform) => transform,
            Err(err) => {
                log::warn!("{err}; using native scale 1");
                inputs.native_scale = 1.0;
                TransformState::new(inputs).unwrap_or_default()
            }
        };

        let mut target = Self {
            device,
            buffer: None,
            session: CommandSession::new(),
            transform,
            format: config.format,
            size: config.size,
        };
        if let Err(err) = target.reallocate() {
            log::warn!("render target starts empty: {err}");
        }
        target
    }

    // ── transform ──

    /// Sets the display scale. Non-positive or non-finite values are rejected.
    pub fn set_scale(&mut self, scale: f32) -> Result<(), TargetError> {
        self.update_transform(|inputs| inputs.scale = scale)
    }

    pub fn set_zoom(&mut self, zoom: f32) -> Result<(), TargetError> {
        self.update_transform(|inputs| inputs.zoom = zoom)
    }

    pub fn set_content_offset(&mut self, offset: Vec2) -> Result<(), TargetError> {
        self.update_transform(|inputs| inputs.content_offset = offset)
    }

    /// Sets device pixels per logical point, as reported by the host display.
    pub fn set_native_scale(&mut self, native_scale: f32) -> Result<(), TargetError> {
        self.update_transform(|inputs| inputs.native_scale = native_scale)
    }

    fn update_transform(&mut self, edit: impl FnOnce(&mut TransformInputs)) -> Result<(), TargetError> {
        let mut inputs = self.transform.inputs();
        edit(&mut inputs);
        self.transform.update(inputs).inspect_err(|err| log::warn!("{err}"))
    }

    // ── buffer lifecycle ──

    /// Replaces the buffer with a freshly zeroed one.
    ///
    /// Any open session is committed first, so its draws land in the old
    /// buffer and never in the new one. The clear is committed before this
    /// returns; no session is left open.
    pub fn clear(&mut self) -> Result<(), TargetError> {
        self.commit();
        self.reallocate()?;
        if self.buffer.is_none() {
            return Ok(());
        }

        self.session.reset_load_action(LoadAction::Clear);
        self.session.begin_if_needed(&mut self.device)?;
        if let Some(encoder) = self.session.encoder(&mut self.device, self.buffer.as_ref(), &self.transform) {
            encoder.end();
        }
        self.commit();
        Ok(())
    }

    /// Commits pending work and reallocates at `size`. Same size is a no-op.
    pub fn resize(&mut self, size: Extent) -> Result<(), TargetError> {
        if size == self.size && self.buffer.is_some() {
            return Ok(());
        }
        self.commit();

        let mut inputs = self.transform.inputs();
        inputs.drawable_size = size;
        self.transform.update(inputs)?;
        self.size = size;
        log::debug!("resizing render target to {}x{}", size.width, size.height);
        self.reallocate()
    }

    fn reallocate(&mut self) -> Result<(), TargetError> {
        self.buffer = None;
        self.session.reset_load_action(LoadAction::Clear);
        if self.size.is_degenerate() {
            log::debug!("degenerate size {}x{}, no color buffer", self.size.width, self.size.height);
            return Ok(());
        }
        self.buffer = Some(ColorBuffer::allocate(&mut self.device, self.size, self.format)?);
        Ok(())
    }

    // ── drawing ──

    /// Opens a session unless one is already open.
    pub fn prepare_for_draw(&mut self) -> Result<(), TargetError> {
        if self.buffer.is_none() {
            return Err(TargetError::NoActiveSession);
        }
        self.session.begin_if_needed(&mut self.device)
    }

    /// Encoder for one pass, opening a session if needed.
    ///
    /// `None` when there is no color buffer.
    pub fn request_encoder(&mut self) -> Option<DrawEncoder<'_, D>> {
        if let Err(err) = self.prepare_for_draw() {
            log::debug!("no encoder: {err}");
            return None;
        }
        self.session.encoder(&mut self.device, self.buffer.as_ref(), &self.transform)
    }

    /// Submits the open session. No-op when nothing is recording.
    pub fn commit(&mut self) {
        self.session.commit(&mut self.device);
    }

    /// Reads back committed contents. Uncommitted draws are not included.
    pub fn read_pixels(&mut self) -> Result<PixelData, TargetError> {
        let buffer = self.buffer.as_ref().ok_or(TargetError::NoActiveSession)?;
        buffer.read_pixels(&mut self.device)
    }

    // ── accessors ──

    pub fn state(&self) -> TargetState {
        match (&self.buffer, self.session.is_open()) {
            (None, _) => TargetState::Empty,
            (Some(_), false) => TargetState::Ready,
            (Some(_), true) => TargetState::Recording,
        }
    }

    #[inline]
    pub fn size(&self) -> Extent {
        self.size
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Current texture, `None` for a degenerate size.
    pub fn texture(&self) -> Option<&D::Texture> {
        self.buffer.as_ref().map(ColorBuffer::texture)
    }

    pub fn color_buffer(&self) -> Option<&ColorBuffer<D>> {
        self.buffer.as_ref()
    }

    #[inline]
    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Load action of the next pass.
    #[inline]
    pub fn load_action(&self) -> LoadAction {
        self.session.load_action()
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: GpuDevice> Drop for RenderTarget<D> {
    fn drop(&mut self) {
        let discarded = self.session.discard();
        if discarded > 0 {
            log::warn!("dropping render target with {discarded} uncommitted passes");
        }
    }
}
