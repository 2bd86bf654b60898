//! GPU device initialization and capability detection.

use crate::error::GpuError;

/// Features every device must offer: the kernel does its plane mapping and
/// iteration in f64.
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::SHADER_F64;

/// Holds the wgpu adapter, device and queue.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

/// Result of GPU initialization attempt.
pub enum GpuAvailability {
    Available(GpuContext),
    Unavailable(String),
}

impl GpuContext {
    /// Attempt to initialize a headless GPU context. Returns Unavailable on any failure.
    pub async fn try_init() -> GpuAvailability {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        match Self::init_internal(&instance, None).await {
            Ok(ctx) => GpuAvailability::Available(ctx),
            Err(e) => {
                log::warn!("GPU initialization failed: {e}");
                GpuAvailability::Unavailable(e.to_string())
            }
        }
    }

    /// Initialize a context whose adapter can present to `surface`.
    pub async fn for_surface(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<Self, GpuError> {
        Self::init_internal(instance, Some(surface)).await
    }

    async fn init_internal(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, GpuError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        log::info!("GPU adapter: {adapter_info:?}");

        let missing = REQUIRED_FEATURES.difference(adapter.features());
        if !missing.is_empty() {
            return Err(GpuError::MissingFeatures(missing));
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("fractaldive"),
                    required_features: REQUIRED_FEATURES,
                    required_limits: adapter.limits(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            adapter,
            device,
            queue,
            adapter_info,
        })
    }
}
