use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;

pub struct AppConfig {
    pub title: String,
    /// Size of the frame buffer the game draws into.
    pub logical_size: SurfaceSize,
    pub resizable: bool,
    pub vsync: bool,
    pub frame_interval: Duration,
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
}

/// Input collected between two redraws. Cleared after every `update_state`.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    /// Cursor position in frame-buffer coordinates.
    pub mouse_pos: Option<(u32, u32)>,
    /// Left button released this frame.
    pub mouse_up: bool,
    /// Keys pressed this frame, in arrival order. OS key-repeat presses are included.
    pub keys_pressed: Vec<VirtualKeyCode>,
}

impl InputFrame {
    fn clear_edges(&mut self) {
        self.mouse_up = false;
        self.keys_pressed.clear();
    }
}

pub trait GameApp {
    type State;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State;

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        ctx: &mut AppContext,
    );

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d);

    /// Return `true` to swallow the event before the default handling runs.
    fn handle_event(
        &mut self,
        _event: &Event<()>,
        _state: &mut Self::State,
        _control_flow: &mut ControlFlow,
    ) -> bool {
        false
    }
}

pub fn run_game<G>(config: AppConfig, mut game: G) -> Result<(), Box<dyn Error>>
where
    G: GameApp + 'static,
    G::State: 'static,
{
    let event_loop = EventLoop::new();
    let logical = config.logical_size;
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(LogicalSize::new(logical.width as f64, logical.height as f64))
        .with_resizable(config.resizable)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let pixels = {
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        PixelsBuilder::new(logical.width, logical.height, surface_texture)
            .enable_vsync(config.vsync)
            .build()?
    };
    let renderer = PixelsRenderer2d::new(pixels, logical)?;

    let mut ctx = AppContext { window, renderer };
    let mut state = game.init_state(&mut ctx);
    let mut input = InputFrame::default();
    let frame_interval = config.frame_interval;
    let mut last_frame = Instant::now();
    let mut next_redraw = last_frame;

    tracing::info!(
        width = logical.width,
        height = logical.height,
        "window created"
    );

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(next_redraw);

        if game.handle_event(&event, &mut state, control_flow) {
            return;
        }

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    if let Err(err) = ctx
                        .renderer
                        .resize_surface(SurfaceSize::new(size.width, size.height))
                    {
                        tracing::warn!("resize failed: {err}");
                    }
                    ctx.window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.mouse_pos = ctx
                        .renderer
                        .window_pos_to_buffer((position.x as f32, position.y as f32));
                }
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } => {
                    input.mouse_up = true;
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    input.keys_pressed.push(*key);
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(last_frame);
                last_frame = now;

                game.update_state(&mut state, &input, dt, &mut ctx);
                input.clear_edges();

                ctx.renderer.draw_frame(|gfx| game.render(&state, gfx));
                if let Err(err) = ctx.renderer.present() {
                    tracing::error!("present failed: {err}");
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                if now >= next_redraw {
                    next_redraw = now + frame_interval;
                    ctx.window.request_redraw();
                }
                *control_flow = ControlFlow::WaitUntil(next_redraw);
            }
            _ => {}
        }
    });
}
