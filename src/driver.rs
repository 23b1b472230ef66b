//! Frame driver: application event loop and per-tick orchestration.
//!
//! The driver starts Idle, initializes the GPU context and requests camera
//! access once, then transitions to Ticking permanently. Each tick, in
//! order:
//!
//! 1. advance the cube rotation by one degree (wrapping at 360)
//! 2. render the scene into the offscreen target
//! 3. upload the current video frame (silently skipped when absent)
//! 4. composite video over scene with the current chroma-key parameters
//! 5. schedule the next tick (vsync-paced redraw request)
//!
//! The loop has no termination condition of its own; it runs until the host
//! process ends or the [`CancelToken`] fires.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    compositor::Compositor,
    context::Context,
    scene::SceneRenderer,
    video::{CameraCapture, VideoFrameSource, VideoSource},
};

/// Threshold change per arrow-key press.
const THRESHOLD_STEP: f32 = 0.05;

/// Cooperative stop signal for the render loop.
///
/// The default binary never cancels; tests and embedders use this to give
/// the otherwise endless loop an exit condition.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Driver lifecycle. Idle until camera access (or its absence) resolves,
/// then Ticking for the rest of the process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverState {
    #[default]
    Idle,
    Ticking,
}

impl DriverState {
    /// One-way transition; there is no way back to Idle.
    pub fn begin_ticking(&mut self) {
        *self = DriverState::Ticking;
    }
}

/// Rotation state, advanced once per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickState {
    angle: f32,
}

impl TickState {
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advance by one tick and return the new angle.
    pub fn advance(&mut self) -> f32 {
        self.angle = crate::math::advance_angle(self.angle);
        self.angle
    }
}

/// Everything a configured renderer owns: GPU context plus the three
/// rendering components.
struct AppState {
    ctx: Context,
    scene: SceneRenderer,
    compositor: Compositor,
    video: VideoFrameSource,
    tick: TickState,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> Result<Self> {
        let ctx = Context::new(window).await?;
        let scene = SceneRenderer::new(&ctx.device, &ctx.queue).await;

        // The one async-feeling operation: camera acquisition. Failure is
        // recoverable; the renderer proceeds with video permanently absent.
        let source: Option<Box<dyn VideoSource>> = match CameraCapture::new(0) {
            Ok(cam) => Some(Box::new(cam)),
            Err(e) => {
                log::warn!("camera unavailable, continuing without video: {e}");
                None
            }
        };
        let video = VideoFrameSource::new(&ctx.device, &ctx.queue, source);
        let compositor = Compositor::new(&ctx.device, ctx.config.format);

        Ok(Self {
            ctx,
            scene,
            compositor,
            video,
            tick: TickState::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            self.ctx.resize(width, height);
            // The offscreen target was reallocated; cached views are stale.
            self.compositor.invalidate_bindings();
        }
    }

    /// One tick of the render loop. See the module docs for the ordering.
    fn render_tick(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        if !self.is_surface_configured {
            self.ctx.window.request_redraw();
            return Ok(());
        }

        let angle = self.tick.advance();

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Tick Encoder"),
            });

        if let Err(e) = self
            .scene
            .render(&self.ctx.queue, &self.ctx.offscreen, &mut encoder, angle)
        {
            // Only reachable through a caller bug in the transform math;
            // surface it loudly instead of presenting wrong normals.
            panic!("scene render failed: {e}");
        }
        self.video.upload_current_frame(&self.ctx.device, &self.ctx.queue);
        self.compositor.render(
            &self.ctx.device,
            &self.ctx.queue,
            &self.ctx.offscreen,
            &mut encoder,
            &view,
            &self.video,
        );

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Schedule the next tick; vsync paces the redraw.
        self.ctx.window.request_redraw();
        Ok(())
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let params = self.compositor.params();
        match event.physical_key {
            PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.compositor.set_threshold(params.threshold + THRESHOLD_STEP);
            }
            PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.compositor.set_threshold(params.threshold - THRESHOLD_STEP);
            }
            PhysicalKey::Code(KeyCode::KeyR) => {
                self.compositor.set_chroma_key(Vector3::new(1.0, 0.0, 0.0));
            }
            PhysicalKey::Code(KeyCode::KeyG) => {
                self.compositor.set_chroma_key(Vector3::new(0.0, 1.0, 0.0));
            }
            PhysicalKey::Code(KeyCode::KeyB) => {
                self.compositor.set_chroma_key(Vector3::new(0.0, 0.0, 1.0));
            }
            _ => (),
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    driver_state: DriverState,
    cancel: CancelToken,
}

impl App {
    pub fn new(async_runtime: tokio::runtime::Runtime, cancel: CancelToken) -> Self {
        Self {
            async_runtime,
            state: None,
            driver_state: DriverState::default(),
            cancel,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes().with_title("chromix");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        // Idle until context and camera acquisition resolve, then Ticking.
        match self.async_runtime.block_on(AppState::new(window)) {
            Ok(state) => {
                self.state = Some(state);
                self.driver_state.begin_ticking();
                if let Some(state) = &self.state {
                    state.ctx.window.request_redraw();
                }
            }
            Err(e) => {
                // Fatal: no graphics context means no render loop at all.
                log::error!("initialization failed, no graphics context: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => state.handle_key(&event),
            WindowEvent::RedrawRequested => {
                if self.cancel.is_cancelled() || self.driver_state != DriverState::Ticking {
                    if self.cancel.is_cancelled() {
                        event_loop.exit();
                    }
                    return;
                }
                match state.render_tick() {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                        state.ctx.window.request_redraw();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Run the compositing renderer until the window closes or `cancel` fires.
pub fn run_cancellable(cancel: CancelToken) -> Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let async_runtime = tokio::runtime::Runtime::new()?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(async_runtime, cancel);
    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Run with no external exit condition; the loop lives as long as the
/// process. This is intentional for an interactive demo.
pub fn run() -> Result<()> {
    run_cancellable(CancelToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_starts_idle_and_transition_is_permanent() {
        let mut s = DriverState::default();
        assert_eq!(s, DriverState::Idle);
        s.begin_ticking();
        assert_eq!(s, DriverState::Ticking);
        s.begin_ticking();
        assert_eq!(s, DriverState::Ticking);
    }

    #[test]
    fn tick_state_advances_and_wraps() {
        let mut tick = TickState::default();
        assert_eq!(tick.angle(), 0.0);
        for _ in 0..360 {
            tick.advance();
        }
        assert!(tick.angle().abs() < 1e-3);
        assert!((tick.advance() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn cancel_token_fires_once_and_stays() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
