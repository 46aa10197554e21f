//! Event pump and application loop.
//!
//! [`run`] opens a window, creates the [`Context`] and drives one
//! [`SceneHandler`] until the window closes or the scene asks to exit.
//!
//! # Lifecycle
//!
//! 1. `on_load` once the window and GPU are ready; an error ends the loop and
//!    is returned from [`run`]
//! 2. window and device events are folded into an [`Input`] snapshot
//! 3. every redraw: `on_update`, the returned [`Command`]s, then `on_render`
//!    inside a pass that cleared colour and depth
//! 4. `on_unload` when the loop exits

use std::{path::PathBuf, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window},
};

use crate::{context::Context, data_structures::texture::Texture, input::Input};

/// Pixels treated as one wheel line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 20.0;
const WINDOW_SIZE: LogicalSize<u32> = LogicalSize::new(800, 600);

/// Requests a scene hands back to the pump from `on_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CaptureCursor,
    ReleaseCursor,
    ToggleVsync,
    Exit,
    /// Background audio to start. There is no playback backend; the pump
    /// only logs the request.
    PlayAudio(PathBuf),
}

/// A scene driven by the pump.
#[allow(async_fn_in_trait)]
pub trait SceneHandler {
    /// Load programs, textures and meshes.
    async fn on_load(&mut self, ctx: &Context) -> anyhow::Result<()>;

    /// Handle input for this frame. `elapsed` is the time since the last
    /// frame.
    fn on_update(&mut self, input: &Input, elapsed: Duration) -> Vec<Command>;

    /// Record draw calls into a pass that already cleared colour and depth.
    fn on_render(&mut self, ctx: &Context, pass: &mut wgpu::RenderPass<'_>, elapsed: Duration);

    /// The surface changed size. Never called with a zero dimension.
    fn on_resize(&mut self, width: u32, height: u32);

    /// Wheel movement in lines, positive away from the user.
    fn on_scroll(&mut self, delta: f32);

    /// Release GPU resources and stop background tasks.
    fn on_unload(&mut self);
}

#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) -> bool {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            true
        } else {
            false
        }
    }

    fn render<S: SceneHandler>(
        &mut self,
        scene: &mut S,
        elapsed: Duration,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            scene.on_render(&self.ctx, &mut render_pass, elapsed);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn set_cursor_captured(&self, captured: bool) {
        let window = &self.ctx.window;
        if captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grabbed {
                log::warn!("could not grab the cursor: {e}");
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("could not release the cursor: {e}");
        }
        window.set_cursor_visible(!captured);
    }
}

pub struct App<S: SceneHandler> {
    async_runtime: tokio::runtime::Runtime,
    scene: S,
    state: Option<AppState>,
    input: Input,
    last_time: Instant,
    error: Option<anyhow::Error>,
    unloaded: bool,
}

impl<S: SceneHandler> App<S> {
    pub fn new(scene: S) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            scene,
            state: None,
            input: Input::new(),
            last_time: Instant::now(),
            error: None,
            unloaded: false,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, commands: Vec<Command>) {
        let Some(state) = &mut self.state else {
            return;
        };
        for command in commands {
            match command {
                Command::CaptureCursor => state.set_cursor_captured(true),
                Command::ReleaseCursor => state.set_cursor_captured(false),
                Command::ToggleVsync => {
                    let on = state.ctx.toggle_vsync();
                    println!("VSync: {}", if on { "On" } else { "Off" });
                }
                Command::Exit => event_loop.exit(),
                Command::PlayAudio(path) => {
                    log::info!("background audio requested: {}", path.display());
                }
            }
        }
    }

    fn unload(&mut self) {
        if !self.unloaded && self.state.is_some() {
            self.unloaded = true;
            self.scene.on_unload();
        }
    }
}

impl<S: SceneHandler> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("Lantern")
            .with_inner_size(WINDOW_SIZE);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let handle = self.async_runtime.handle().clone();
        let ctx = match self.async_runtime.block_on(Context::new(window, handle)) {
            Ok(ctx) => ctx,
            Err(e) => return self.fail(event_loop, e),
        };
        if let Err(e) = self.async_runtime.block_on(self.scene.on_load(&ctx)) {
            return self.fail(event_loop, e.context("failed to load the scene"));
        }
        log::info!("scene loaded");

        let mut state = AppState {
            ctx,
            is_surface_configured: false,
        };
        let size = state.ctx.window.inner_size();
        if state.resize(size.width, size.height) {
            self.scene.on_resize(size.width, size.height);
        }
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.last_time = Instant::now();
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.move_pointer(dx as f32, dy as f32);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.state.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state
                    && state.resize(size.width, size.height)
                {
                    self.scene.on_resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(focused) => self.input.set_focused(focused),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.input.press_key(code),
                        ElementState::Released => self.input.release_key(code),
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match button_state {
                ElementState::Pressed => self.input.press_button(button),
                ElementState::Released => self.input.release_button(button),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.scene.on_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let commands = self.scene.on_update(&self.input, dt);
                self.input.end_frame();
                self.apply(event_loop, commands);

                let Some(state) = &mut self.state else {
                    return;
                };
                match state.render(&mut self.scene, dt) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unload();
    }
}

/// Runs `scene` until the window closes. Returns the load error, if any.
pub fn run<S: SceneHandler>(scene: S) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(scene)?;
    event_loop.run_app(&mut app)?;
    app.unload();

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
