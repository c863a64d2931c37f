use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::coords::Extent;
use crate::render::shapes::ShapeRenderer;
use crate::render::PassDesc;

use super::{DeviceInit, GpuDevice, PixelData, PixelFormat, TargetError};

/// wgpu rows in buffer copies must be aligned to this many bytes.
const COPY_ROW_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Headless wgpu device + queue.
///
/// - creates (or adopts) the Device/Queue pair
/// - allocates color-buffer textures
/// - encodes shape passes into command encoders and submits them
/// - reads textures back through a mapped staging buffer
pub struct WgpuDevice {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Shape pipeline, built lazily per attachment format.
    shapes: ShapeRenderer,
}

impl WgpuDevice {
    /// Acquires an adapter and a device/queue pair.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: DeviceInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let required_limits = init.required_limits.unwrap_or_else(|| {
            wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits())
        });

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(init.label),
                required_features: init.required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self::from_parts(device, queue))
    }

    /// Blocking wrapper around [`new`](Self::new).
    pub fn new_blocking(init: DeviceInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Adopts a device/queue pair owned by the host application.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            shapes: ShapeRenderer::default(),
        }
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Runs `op` inside out-of-memory and validation error scopes.
    ///
    /// Errors caught here are returned instead of reaching the uncaptured-error
    /// handler, which panics by default.
    fn capture<T>(&self, op: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        let oom = self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = op(&self.device);
        let validation_err = pollster::block_on(validation.pop());
        let oom_err = pollster::block_on(oom.pop());
        (value, oom_err.or(validation_err))
    }

    fn wait_for(&self, submission: wgpu::SubmissionIndex) -> Result<(), wgpu::PollError> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            })
            .map(|_| ())
    }
}

impl GpuDevice for WgpuDevice {
    type Texture = wgpu::Texture;
    type CommandBuffer = wgpu::CommandEncoder;

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_texture(&mut self, size: Extent, format: PixelFormat) -> Result<wgpu::Texture, TargetError> {
        let max = self.max_texture_dimension();
        if size.is_degenerate() || size.width > max || size.height > max {
            return Err(TargetError::allocation(format!(
                "{}x{} outside device range 1..={max}",
                size.width, size.height
            )));
        }

        let (texture, err) = self.capture(|device| device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pigment color buffer"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.to_wgpu(),
            // Sampled by presentation/compositing; copied for readback.
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        }));
        match err {
            Some(err) => Err(TargetError::allocation(format!("device rejected texture: {err}"))),
            None => Ok(texture),
        }
    }

    fn fill_zero(&mut self, texture: &wgpu::Texture) -> Result<(), TargetError> {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pigment zero fill"),
            });

        // Clear pass; dropped before the encoder is finished.
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pigment zero fill"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.wait_for(submission)
            .map_err(|err| TargetError::allocation(format!("zero fill did not complete: {err}")))
    }

    fn create_command_buffer(&mut self) -> Result<wgpu::CommandEncoder, TargetError> {
        Ok(self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pigment session"),
            }))
    }

    fn encode_pass(&mut self, commands: &mut wgpu::CommandEncoder, pass: PassDesc<'_, wgpu::Texture>) {
        self.shapes.encode(&self.device, commands, &pass);
    }

    fn submit(&mut self, commands: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(commands.finish()));
    }

    fn read_pixels(
        &mut self,
        texture: &wgpu::Texture,
        size: Extent,
        format: PixelFormat,
    ) -> Result<PixelData, TargetError> {
        let bpp = format.bytes_per_pixel() as u32;
        let row_bytes = size.width * bpp;
        let padded_row_bytes = row_bytes.div_ceil(COPY_ROW_ALIGNMENT) * COPY_ROW_ALIGNMENT;

        let (staging, err) = self.capture(|device| device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pigment readback"),
            size: u64::from(padded_row_bytes) * u64::from(size.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        }));
        if let Some(err) = err {
            return Err(TargetError::readback(format!("staging buffer: {err}")));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pigment readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(size.height),
                },
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
        let submission = self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            drop(sender.send(res));
        });
        self.wait_for(submission)
            .map_err(|err| TargetError::readback(err.to_string()))?;
        receiver
            .recv()
            .map_err(|err| TargetError::readback(err.to_string()))?
            .map_err(|err| TargetError::readback(err.to_string()))?;

        let mapped = slice.get_mapped_range();
        let mut bytes = Vec::with_capacity(row_bytes as usize * size.height as usize);
        for row in mapped.chunks(padded_row_bytes as usize).take(size.height as usize) {
            bytes.extend_from_slice(&row[..row_bytes as usize]);
        }
        drop(mapped);
        staging.unmap();

        Ok(PixelData { size, format, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::logging::{init_logging, LoggingConfig};
    use crate::paint::Color;
    use crate::target::RenderTarget;

    /// Hardware (or fallback) adapter, when the machine has one.
    fn device() -> Option<WgpuDevice> {
        init_logging(LoggingConfig::for_tests());
        match WgpuDevice::new_blocking(DeviceInit::default()) {
            Ok(device) => Some(device),
            Err(err) => {
                log::warn!("skipping wgpu test: {err:#}");
                None
            }
        }
    }

    #[test]
    fn red_rect_lands_on_the_gpu_texture() {
        let Some(device) = device() else { return };
        let mut target = RenderTarget::new(device, Extent::new(100, 100), PixelFormat::Rgba8Unorm);
        assert!(target.read_pixels().unwrap().is_zeroed());

        if let Some(mut encoder) = target.request_encoder() {
            encoder.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        }
        target.commit();

        let pixels = target.read_pixels().unwrap();
        assert_eq!(pixels.rgba_at(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(pixels.rgba_at(50, 50), Some([0, 0, 0, 0]));

        target.clear().unwrap();
        assert!(target.read_pixels().unwrap().is_zeroed());
    }

    #[test]
    fn device_errors_are_captured_instead_of_panicking() {
        let Some(device) = device() else { return };
        // MAP_READ | MAP_WRITE needs MAPPABLE_PRIMARY_BUFFERS, which is not requested.
        let (_buffer, err) = device.capture(|d| {
            d.create_buffer(&wgpu::BufferDescriptor {
                label: Some("invalid usage"),
                size: 16,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::MAP_WRITE,
                mapped_at_creation: false,
            })
        });
        assert!(err.is_some());

        // The device stays usable afterwards.
        let (_buffer, err) = device.capture(|d| {
            d.create_buffer(&wgpu::BufferDescriptor {
                label: Some("valid usage"),
                size: 16,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            })
        });
        assert!(err.is_none());
    }

    #[test]
    fn oversized_texture_is_an_allocation_failure() {
        let Some(mut device) = device() else { return };
        let too_big = device.max_texture_dimension() + 1;
        let err = device
            .create_texture(Extent::new(too_big, 1), PixelFormat::Rgba8Unorm)
            .unwrap_err();
        assert!(matches!(err, TargetError::AllocationFailure { .. }));
    }
}
