#![deny(clippy::all)]
#![forbid(unsafe_code)]

use error_iter::ErrorIter as _;
use life_grid::{
    Frame, GridSize, Renderer, Simulation, Speed, SpeedBounds, alpha_blend_with_background,
};
use log::{error, info};
use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::EventLoopError;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Cursor, CursorIcon, Fullscreen, Window, WindowId};

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub cell_pixel_width: u32,
    pub initial_speed: f64,
    pub speed_bounds: SpeedBounds,
    pub speed_step_per_key: f64,
    pub speed_step_per_line: f64,
    /// Converts touchpad pixel scrolling into wheel lines.
    pub pixels_per_line: f64,
    pub background: [u8; 4],
}

impl Settings {
    pub fn speed(&self) -> Speed {
        Speed::new(self.initial_speed, self.speed_bounds)
    }

    fn background_color(&self) -> Color {
        let [r, g, b, _] = self.background.map(|channel| channel as f64 / 0xff as f64);
        Color { r, g, b, a: 1.0 }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_pixel_width: 8,
            initial_speed: 20.0,
            speed_bounds: SpeedBounds::default(),
            speed_step_per_key: 5.0,
            speed_step_per_line: 2.0,
            pixels_per_line: 20.0,
            background: [0, 0, 0, 0xff],
        }
    }
}

pub fn window_size_to_grid_size(window_size: PhysicalSize<u32>, cell_pixel_width: u32) -> GridSize {
    let cell_pixel_width = cell_pixel_width.max(1);
    GridSize::new(
        (window_size.width / cell_pixel_width).max(1),
        (window_size.height / cell_pixel_width).max(1),
    )
}

/// Opens a fullscreen window and runs the simulation one tick-fraction per
/// displayed frame until the user quits.
pub fn animate<F>(settings: Settings, build_simulation: F) -> Result<(), EventLoopError>
where
    F: Fn(GridSize, Speed) -> Simulation,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut AppEventHandler::new(settings, build_simulation))
}

/// Paints one pixel per cell into an RGBA frame buffer.
pub struct PixelsRenderer<'a> {
    screen: &'a mut [u8],
    background: [u8; 4],
}

impl<'a> PixelsRenderer<'a> {
    pub fn new(screen: &'a mut [u8], background: [u8; 4]) -> Self {
        Self { screen, background }
    }
}

impl Renderer for PixelsRenderer<'_> {
    fn render(&mut self, frame: &Frame<'_>) {
        let progress = frame.progress();
        let background = self.background;
        for ((_, view), pixel) in frame.cells().zip(self.screen.chunks_exact_mut(4)) {
            let color = view
                .color_rgba(progress)
                .map_or(background, |color| alpha_blend_with_background(color, background));
            pixel.copy_from_slice(&color);
        }
    }
}

struct App {
    simulation: Simulation,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    settings: Settings,
}

impl App {
    fn new<F>(event_loop: &ActiveEventLoop, settings: Settings, build_simulation: &F) -> Option<Self>
    where
        F: Fn(GridSize, Speed) -> Simulation,
    {
        let window = event_loop
            .create_window(Self::window_attributes())
            .map_err(|err| log_error("create_window", err))
            .ok()?;
        let window = Arc::new(window);

        let window_size = window.inner_size();
        let grid_size = window_size_to_grid_size(window_size, settings.cell_pixel_width);
        info!(
            "Window {}x{}, {} pixels per cell",
            window_size.width, window_size.height, settings.cell_pixel_width
        );
        let simulation = build_simulation(grid_size, settings.speed());

        let pixels = Self::build_pixels(&window, grid_size, &settings)
            .map_err(|err| log_error("pixels.build", err))
            .ok()?;
        Some(Self {
            simulation,
            window,
            pixels,
            settings,
        })
    }

    fn window_attributes() -> winit::window::WindowAttributes {
        Window::default_attributes()
            .with_title("Fading Life")
            .with_cursor(Cursor::Icon(CursorIcon::Crosshair))
            .with_fullscreen(Some(Fullscreen::Borderless(None)))
            .with_visible(false)
    }

    fn build_pixels(
        window: &Arc<Window>,
        grid_size: GridSize,
        settings: &Settings,
    ) -> Result<Pixels<'static>, pixels::Error> {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(
            window_size.width.max(1),
            window_size.height.max(1),
            window.clone(),
        );
        PixelsBuilder::new(grid_size.width, grid_size.height, surface_texture)
            .clear_color(settings.background_color())
            .build()
    }

    fn on_create(&mut self) {
        self.window.request_redraw();
        self.window.set_visible(true);
    }

    fn on_redraw(&mut self) -> bool {
        let screen = self.pixels.frame_mut();
        debug_assert_eq!(screen.len(), 4 * self.simulation.matrix().num_cells());

        let mut renderer = PixelsRenderer::new(screen, self.settings.background);
        self.simulation.on_frame(&mut renderer);
        if let Err(err) = self.pixels.render() {
            log_error("pixels.render", err);
            return false;
        }
        true
    }

    // The grid never changes size; only its on-screen scale does.
    fn on_resize(&mut self, size: PhysicalSize<u32>) -> bool {
        if let Err(err) = self
            .pixels
            .resize_surface(size.width.max(1), size.height.max(1))
        {
            log_error("pixels.resize_surface", err);
            return false;
        }
        true
    }

    fn on_click(&mut self) {
        self.simulation.add_seed();
    }

    fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.simulation
            .adjust_speed(scroll_speed_delta(delta, &self.settings));
    }

    fn on_speed_key(&mut self, faster: bool) {
        let step = self.settings.speed_step_per_key;
        self.simulation
            .adjust_speed(if faster { step } else { -step });
    }
}

fn scroll_speed_delta(delta: MouseScrollDelta, settings: &Settings) -> f64 {
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(position) => position.y / settings.pixels_per_line,
    };
    lines * settings.speed_step_per_line
}

fn log_error<E: std::error::Error + 'static>(method_name: &str, err: E) {
    error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

struct AppEventHandler<F>
where
    F: Fn(GridSize, Speed) -> Simulation,
{
    settings: Settings,
    build_simulation: F,
    app: Option<App>,
}

impl<F> AppEventHandler<F>
where
    F: Fn(GridSize, Speed) -> Simulation,
{
    fn new(settings: Settings, build_simulation: F) -> Self {
        Self {
            settings,
            build_simulation,
            app: None,
        }
    }
}

impl<F> ApplicationHandler for AppEventHandler<F>
where
    F: Fn(GridSize, Speed) -> Simulation,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match App::new(event_loop, self.settings, &self.build_simulation) {
            Some(mut app) => {
                app.on_create();
                self.app = Some(app);
            }
            None => event_loop.exit(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match (code, state) {
                (KeyCode::Escape | KeyCode::KeyQ | KeyCode::KeyX, ElementState::Released)
                    if !repeat =>
                {
                    event_loop.exit();
                }
                (KeyCode::ArrowUp, ElementState::Pressed) => app.on_speed_key(true),
                (KeyCode::ArrowDown, ElementState::Pressed) => app.on_speed_key(false),
                _ => (),
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                app.on_click();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                app.on_scroll(delta);
            }
            WindowEvent::Resized(size) => {
                if !app.on_resize(size) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if !app.on_redraw() {
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.as_ref() {
            app.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_grid::{Loc, Random};
    use winit::dpi::PhysicalPosition;

    const BLACK: [u8; 4] = [0, 0, 0, 0xff];

    #[test]
    fn grid_size_from_window_size() {
        let size = window_size_to_grid_size(PhysicalSize::new(1920, 1080), 8);
        assert_eq!(size, GridSize::new(240, 135));
    }

    #[test]
    fn tiny_window_still_gets_a_cell() {
        let size = window_size_to_grid_size(PhysicalSize::new(5, 0), 8);
        assert_eq!(size, GridSize::new(1, 1));
    }

    #[test]
    fn scroll_adjusts_speed_by_lines() {
        let settings = Settings::default();
        assert_eq!(
            scroll_speed_delta(MouseScrollDelta::LineDelta(0.0, 3.0), &settings),
            6.0
        );
        assert_eq!(
            scroll_speed_delta(MouseScrollDelta::LineDelta(0.0, -1.0), &settings),
            -2.0
        );
        let pixel_delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0));
        assert_eq!(scroll_speed_delta(pixel_delta, &settings), 4.0);
    }

    #[test]
    fn default_settings_speed_is_in_bounds() {
        let settings = Settings::default();
        let speed = settings.speed();
        assert_eq!(speed.value(), 20.0);
        assert_eq!(speed.bounds(), SpeedBounds::default());
    }

    #[test]
    fn renderer_paints_fading_cells_over_background() {
        let mut simulation = Simulation::new(
            GridSize::new(3, 2),
            Speed::new(50.0, SpeedBounds::default()),
            Random::from_seed(1),
        );
        simulation.seed_pattern(&[Loc::new(1, 2)]);

        let mut screen = vec![0u8; 4 * 6];
        let outcome = simulation.on_frame(&mut PixelsRenderer::new(&mut screen, BLACK));
        assert!(!outcome.ticked);

        let pixels: Vec<&[u8]> = screen.chunks_exact(4).collect();
        for pixel in &pixels[0..5] {
            assert_eq!(*pixel, &BLACK[..]);
        }
        assert_eq!(pixels[5][3], 0xff);
        assert_ne!(pixels[5], &BLACK[..]);
    }
}
