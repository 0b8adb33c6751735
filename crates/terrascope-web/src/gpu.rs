use terrascope_core::TerrascopeError;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, TextureFormat};

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub surface_format: TextureFormat,
    /// Adapter name and backend, for the debug panel.
    pub adapter_label: String,
}

/// Open a WebGPU device on `canvas` and configure its surface at the given
/// size. There is no WebGL fallback.
pub async fn init_gpu(
    canvas: web_sys::HtmlCanvasElement,
    width: u32,
    height: u32,
) -> Result<GpuContext, TerrascopeError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| TerrascopeError::SurfaceConfigFailed(e.to_string()))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        })
        .await
        .ok_or_else(|| {
            TerrascopeError::AdapterNotFound("this browser does not expose WebGPU".into())
        })?;
    let info = adapter.get_info();
    let adapter_label = format!("{} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("terrascope-device"),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(|e| TerrascopeError::DeviceRequestFailed(e.to_string()))?;

    let mut surface_config = surface
        .get_default_config(&adapter, width, height)
        .ok_or_else(|| TerrascopeError::SurfaceConfigFailed("surface not supported".into()))?;
    // Shaders write linear color.
    if let Some(srgb) = surface
        .get_capabilities(&adapter)
        .formats
        .into_iter()
        .find(TextureFormat::is_srgb)
    {
        surface_config.format = srgb;
    }
    surface.configure(&device, &surface_config);
    log::info!("GPU ready: {adapter_label}, {:?}", surface_config.format);

    Ok(GpuContext {
        device,
        queue,
        surface,
        surface_format: surface_config.format,
        surface_config,
        adapter_label,
    })
}
