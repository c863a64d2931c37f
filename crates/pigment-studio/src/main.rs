use anyhow::{Context, Result, bail};
use pigment_engine::coords::{Extent, Rect, Vec2};
use pigment_engine::device::DeviceInit;
use pigment_engine::logging::{LoggingConfig, init_logging};
use pigment_engine::paint::Color;
use pigment_engine::{GpuDevice, PixelFormat, RenderTarget, SoftwareDevice, TargetConfig, WgpuDevice};

const CANVAS: Extent = Extent::new(256, 256);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = TargetConfig {
        size: CANVAS,
        format: PixelFormat::Rgba8Unorm,
        native_scale: 2.0,
    };

    match WgpuDevice::new_blocking(DeviceInit::default()) {
        Ok(device) => {
            log::info!("running on wgpu");
            run(RenderTarget::with_config(device, config))
        }
        Err(err) => {
            log::warn!("no GPU adapter ({err:#}), falling back to the software device");
            run(RenderTarget::with_config(SoftwareDevice::new(), config))
        }
    }
}

/// Paints a short stroke, reads it back, then clears and verifies.
fn run<D: GpuDevice>(mut target: RenderTarget<D>) -> Result<()> {
    target.set_scale(1.0)?;
    target.set_zoom(1.5)?;
    target.set_content_offset(Vec2::new(4.0, 4.0))?;

    let ink = Color::from_straight_u8(26, 51, 204, 153);
    {
        let mut encoder = target
            .request_encoder()
            .context("render target has no color buffer")?;
        encoder.fill_rect(Rect::new(8.0, 8.0, 140.0, 140.0), Color::WHITE);
        for dab in stroke(Vec2::new(20.0, 30.0), Vec2::new(140.0, 110.0), 6.0) {
            encoder.dab(dab, 6.0, ink);
        }
        log::info!("recorded {} draws", encoder.draw_count());
    }
    target.commit();

    let pixels = target.read_pixels().context("reading back the stroke")?;
    log::info!(
        "stroke committed: {} of {} texels covered",
        pixels.covered_texels(),
        pixels.size.area()
    );

    target.clear().context("clearing the canvas")?;
    if !target.read_pixels()?.is_zeroed() {
        bail!("canvas not empty after clear");
    }
    log::info!("canvas cleared");
    Ok(())
}

/// Dab centers along a straight segment, `spacing` points apart.
fn stroke(from: Vec2, to: Vec2, spacing: f32) -> impl Iterator<Item = Vec2> {
    let delta = to - from;
    let length = (delta.x * delta.x + delta.y * delta.y).sqrt();
    let steps = (length / spacing).ceil().max(1.0) as u32;
    (0..=steps).map(move |i| from + delta * (i as f32 / steps as f32))
}
