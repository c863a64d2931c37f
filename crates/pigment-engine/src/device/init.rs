/// Initialization parameters for [`WgpuDevice`](super::WgpuDevice).
///
/// Headless: no surface is created, so any adapter able to render to a
/// texture qualifies.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter preference. Painting favors the discrete GPU when present.
    pub power_preference: wgpu::PowerPreference,

    /// Request a software adapter (e.g. llvmpipe/WARP) instead of hardware.
    pub force_fallback_adapter: bool,

    /// Required wgpu features. Empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter. `None` asks for downlevel defaults
    /// raised to the adapter's texture resolution.
    pub required_limits: Option<wgpu::Limits>,

    /// Device label for debugging tools.
    pub label: &'static str,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: None,
            label: "pigment device",
        }
    }
}
