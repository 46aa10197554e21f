use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::data_structures::texture;

/// Window, GPU handles and the surface state shared by the pump and the
/// scene.
#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: texture::Texture,
    pub clear_colour: wgpu::Color,
    /// Handle of the pump's runtime, for background tasks.
    pub runtime: tokio::runtime::Handle,
}

/// `Color::DimGray`.
pub const DIM_GRAY: wgpu::Color = wgpu::Color {
    r: 105.0 / 255.0,
    g: 105.0 / 255.0,
    b: 105.0 / 255.0,
    a: 1.0,
};

impl Context {
    pub async fn new(window: Arc<Window>, runtime: tokio::runtime::Handle) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("setting up wgpu");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await
            .context("failed to open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The lighting shader writes linear colour and relies on an sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first().copied())
            .context("the surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            clear_colour: DIM_GRAY,
            runtime,
        })
    }

    pub fn vsync(&self) -> bool {
        self.config.present_mode == wgpu::PresentMode::AutoVsync
    }

    /// Flips between `AutoVsync` and `AutoNoVsync` and reconfigures the
    /// surface. Returns the new state.
    pub fn toggle_vsync(&mut self) -> bool {
        self.config.present_mode = if self.vsync() {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::AutoVsync
        };
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
        self.vsync()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width.max(1) as f32 / self.config.height.max(1) as f32
    }
}
