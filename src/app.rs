//! Window creation and the frame loop.
//!
//! [`run`] owns the winit event loop. Initialization is async (GPU setup
//! and concurrent asset loads), so `resumed` builds a future and resolves
//! it on the tokio runtime natively or via `spawn_local` on the web. Each
//! `RedrawRequested` advances the flight state by the measured dt, syncs
//! the scene graph and draws the hierarchy, then requests the next frame.

use std::sync::Arc;

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::context::Context;
use crate::flight::controls::InputState;
use crate::flight::{FlightScene, FlightState};
use crate::renderer::{Renderer, RendererConfig};
use crate::transform::{Mat4, perspective};

const FOVY_DEG: f32 = 80.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

struct AppState {
    ctx: Context,
    renderer: Renderer,
    scene: FlightScene,
    flight: FlightState,
    input: InputState,
    projection: Mat4,
    last_frame: instant::Instant,
}

impl AppState {
    async fn new(window: Arc<Window>) -> Result<Self> {
        let ctx = Context::new(window).await?;
        let renderer = Renderer::new(&ctx, RendererConfig::default());
        let scene = FlightScene::load(&ctx, &renderer).await?;
        let projection = perspective(FOVY_DEG, ctx.aspect_ratio(), NEAR, FAR);

        Ok(Self {
            ctx,
            renderer,
            scene,
            flight: FlightState::new(),
            input: InputState::default(),
            projection,
            last_frame: instant::Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.projection = perspective(FOVY_DEG, self.ctx.aspect_ratio(), NEAR, FAR);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = instant::Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        // Strict ordering: simulation, then graph sync, then traversal.
        self.flight.update(&self.input, dt);
        self.scene.sync(&self.flight);
        if !self.renderer.light.is_spinning() {
            self.renderer.set_light_direction(self.flight.light_dir);
        }

        match self.renderer.render_hierarchy(
            &self.ctx,
            &self.scene.graph,
            self.scene.plane,
            &Mat4::identity(),
            &self.flight.view,
            &self.projection,
        ) {
            Ok(()) => {}
            Err(wgpu::SurfaceStatus::Lost | wgpu::SurfaceStatus::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(err) => log::warn!("surface error, skipping frame: {err:?}"),
        }

        self.ctx.window.request_redraw();
    }
}

enum AppEvent {
    Initialized(Box<Result<AppState>>),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>) -> Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
        })
    }

    fn install(&mut self, event_loop: &ActiveEventLoop, state: Result<AppState>) {
        match state {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("initialization failed: {err:#}");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("glider");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = self.async_runtime.block_on(init_future);
            assert!(
                self.proxy
                    .send_event(AppEvent::Initialized(Box::new(state)))
                    .is_ok()
            );
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                assert!(
                    proxy
                        .send_event(AppEvent::Initialized(Box::new(init_future.await)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(state) => self.install(event_loop, *state),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.input.handle_window_event(&event) {
            return;
        }
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyL),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => state.renderer.toggle_light_spin(),
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => state.redraw(event_loop),
            _ => {}
        }
    }
}

pub fn run() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
