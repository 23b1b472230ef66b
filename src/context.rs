//! Central GPU and window context.
//!
//! [`Context`] owns the device, queue, surface configuration and the
//! offscreen target shared by the scene pass and the compositor. All global
//! mutable handles of the renderer live here as explicit owned state so the
//! components stay independently constructible and testable.

use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use winit::window::Window;

use crate::data_structures::texture::OffscreenTarget;

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub offscreen: OffscreenTarget,
}

impl Context {
    /// Acquire the GPU. Failure here is fatal: the caller reports it and no
    /// render loop starts.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("no drawing surface available")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("no compatible graphics adapter: {e}"))?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| anyhow!("graphics device request failed: {e}"))?;

        log::info!("surface configuration");
        let surface_caps = surface.get_capabilities(&adapter);
        // Prefer an Srgb surface so composited colors come out as captured.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let offscreen = OffscreenTarget::new(&device, config.width, config.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            offscreen,
        })
    }

    /// Reconfigure the surface and rebuild the offscreen target at the new
    /// size. The video texture is unaffected; it tracks frame size, not
    /// window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.offscreen = OffscreenTarget::new(&self.device, width, height);
        }
    }
}
