//! Simulation builder and runner

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::error::{GpuError, SimulationError};
use crate::frame;
use crate::gpu::GpuState;
use crate::input::{Input, MouseButton};
use crate::params::SimulationParams;
use crate::scene::ContainerSize;
use crate::state::AppState;
use crate::time::Time;

const DEFAULT_TITLE: &str = "TumbleBox";

/// A tumbling-boxes simulation builder.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// ```ignore
/// TumbleBox::new()
///     .with_box_count(200)
///     .with_gravity(4.0)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct TumbleBox {
    params: SimulationParams,
    seed: Option<u64>,
    title: String,
}

impl TumbleBox {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            params: SimulationParams::default(),
            seed: None,
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Set the number of boxes.
    pub fn with_box_count(mut self, count: usize) -> Self {
        self.params.box_count = count;
        self
    }

    /// Set the edge length of each box.
    pub fn with_box_size(mut self, size: f32) -> Self {
        self.params.box_size = size;
        self
    }

    /// Set the edge length of the container.
    pub fn with_container_size(mut self, size: f32) -> Self {
        self.params.container_size = size;
        self
    }

    /// Set the gravity magnitude.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.params.gravity = gravity;
        self
    }

    /// Replace all parameters at once.
    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Make throw directions reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the window title. The current FPS is appended while running.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Build the state this configuration describes.
    fn build_state(
        &self,
        container: ContainerSize,
        device_pixel_ratio: f32,
    ) -> Result<AppState, SimulationError> {
        let params = self.params.clone();
        let state = match self.seed {
            Some(seed) => AppState::with_seed(params, container, device_pixel_ratio, seed)?,
            None => AppState::new(params, container, device_pixel_ratio)?,
        };
        Ok(state)
    }

    /// Run the simulation.
    ///
    /// Natively this blocks until the window is closed. In the browser it
    /// hands the event loop to the page and returns immediately.
    pub fn run(self) -> Result<(), SimulationError> {
        #[cfg(not(target_arch = "wasm32"))]
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
        #[cfg(target_arch = "wasm32")]
        crate::web::init_logging();

        self.params.validate()?;

        let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let app = App::new(self, event_loop.create_proxy());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            event_loop.run_app(&mut app)?;
            match app.error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
            Ok(())
        }
    }
}

impl Default for TumbleBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Events posted back to the event loop.
enum UserEvent {
    /// Asynchronous GPU setup finished.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    GpuReady(Result<Box<GpuState>, GpuError>),
}

struct App {
    config: TumbleBox,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<UserEvent>,
    window: Option<Arc<Window>>,
    #[cfg(target_arch = "wasm32")]
    container: Option<web_sys::HtmlElement>,
    gpu_state: Option<GpuState>,
    state: Option<AppState>,
    input: Input,
    time: Time,
    error: Option<SimulationError>,
}

impl App {
    fn new(config: TumbleBox, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            config,
            proxy,
            window: None,
            #[cfg(target_arch = "wasm32")]
            container: None,
            gpu_state: None,
            state: None,
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, SimulationError> {
        let attrs = Window::default_attributes().with_title(self.config.title.clone());

        #[cfg(not(target_arch = "wasm32"))]
        let attrs = attrs.with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        #[cfg(target_arch = "wasm32")]
        let attrs = {
            use winit::platform::web::WindowAttributesExtWebSys;
            attrs.with_canvas(Some(crate::web::canvas()?))
        };

        Ok(Arc::new(event_loop.create_window(attrs)?))
    }

    /// Size of the element the scene fills, in logical pixels.
    fn container_size(&self, window: &Window) -> ContainerSize {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(container) = &self.container {
                return crate::web::container_size(container);
            }
        }
        let logical = window.inner_size().to_logical::<u32>(window.scale_factor());
        ContainerSize::new(logical.width, logical.height)
    }

    /// Size the GPU surface should have.
    fn surface_size(window: &Window, state: &AppState) -> PhysicalSize<u32> {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = window;
            let (width, height) = state.scene().viewport.drawing_buffer_size();
            PhysicalSize::new(width, height)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = state;
            window.inner_size()
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window = self.create_window(event_loop)?;
        self.window = Some(window.clone());

        #[cfg(target_arch = "wasm32")]
        {
            self.container = Some(crate::web::container()?);
        }

        let container = self.container_size(&window);
        let state = self
            .config
            .build_state(container, window.scale_factor() as f32)?;
        let size = Self::surface_size(&window, &state);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let gpu_state = pollster::block_on(GpuState::new(window.clone(), size, state.scene()))?;
            self.gpu_state = Some(gpu_state);
            window.request_redraw();
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let scene = state.scene().clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = GpuState::new(window, size, &scene).await.map(Box::new);
                if proxy.send_event(UserEvent::GpuReady(result)).is_err() {
                    log::warn!("Event loop closed before GPU setup finished");
                }
            });
        }

        self.state = Some(state);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(state), Some(gpu_state)) =
            (&self.window, &mut self.state, &mut self.gpu_state)
        else {
            return;
        };

        apply_input(&self.input, state, window.scale_factor() as f32);
        self.input.begin_frame();

        match frame::frame(state, gpu_state) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu_state.resize(gpu_state.size());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        self.time.update();
        if self.time.fps_refreshed() {
            window.set_title(&format!("{} - {:.0} FPS", self.config.title, self.time.fps()));
        }

        window.request_redraw();
    }
}

/// Feed this frame's pointer input into the state.
///
/// Pointer deltas arrive in device pixels and are scaled to logical pixels.
fn apply_input(input: &Input, state: &mut AppState, scale_factor: f32) {
    if input.double_clicked() {
        state.on_double_click();
    }

    let delta = input.mouse_delta() / scale_factor.max(f32::EPSILON);
    if input.mouse_pressed(MouseButton::Left) {
        state.begin_drag();
    }
    if input.mouse_held(MouseButton::Left) {
        state.on_drag(delta);
    }
    if input.mouse_released(MouseButton::Left) {
        state.end_drag();
    }
    if input.mouse_held(MouseButton::Right) {
        state.on_pan(delta);
    }

    let scroll = input.scroll_delta();
    if scroll != 0.0 {
        state.on_wheel(scroll);
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::GpuReady(Ok(gpu_state)) => {
                self.gpu_state = Some(*gpu_state);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            UserEvent::GpuReady(Err(e)) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                let Some(window) = self.window.clone() else {
                    return;
                };
                let container = self.container_size(&window);
                if let Some(state) = &mut self.state {
                    if state.on_resize(container) {
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.resize(Self::surface_size(&window, state));
                        }
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(state) = &mut self.state {
                    state.on_scale_factor_changed(scale_factor as f32);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Instant;
    use glam::Vec2;
    use std::time::Duration;

    fn state() -> AppState {
        TumbleBox::new()
            .with_box_count(8)
            .with_seed(5)
            .build_state(ContainerSize::new(600, 600), 1.0)
            .expect("valid params")
    }

    #[test]
    fn test_builder_sets_params() {
        let sim = TumbleBox::new()
            .with_box_count(12)
            .with_box_size(0.05)
            .with_container_size(2.0)
            .with_gravity(3.0)
            .with_title("Test");
        assert_eq!(
            sim.params(),
            &SimulationParams { box_count: 12, box_size: 0.05, container_size: 2.0, gravity: 3.0 }
        );
        assert_eq!(sim.title, "Test");
    }

    #[test]
    fn test_build_state_rejects_bad_params() {
        let result = TumbleBox::new()
            .with_box_size(-1.0)
            .build_state(ContainerSize::new(600, 600), 1.0);
        assert!(matches!(result, Err(SimulationError::Params(_))));
    }

    #[test]
    fn test_double_click_input_rethrows() {
        let mut state = state();
        for _ in 0..10 {
            state.step();
        }
        let before = state.world().box_velocity(0);

        let mut input = Input::new();
        let t0 = Instant::now();
        input.press(MouseButton::Left, t0);
        input.press(MouseButton::Left, t0 + Duration::from_millis(100));
        apply_input(&input, &mut state, 1.0);

        assert!((state.world().box_velocity(0) - before).length() > 1.0);
    }

    #[test]
    fn test_drag_input_rotates_camera() {
        let mut state = state();
        let mut input = Input::new();
        input.move_cursor(Vec2::new(300.0, 300.0));
        input.press(MouseButton::Left, Instant::now());
        input.move_cursor(Vec2::new(400.0, 300.0));
        apply_input(&input, &mut state, 1.0);
        assert!(state.scene().controls.is_dragging());

        let start = state.scene().camera.position;
        state.step();
        // Damped drag plus paused auto-rotation still moves the camera.
        assert!((state.scene().camera.position - start).length() > 1e-3);

        input.begin_frame();
        input.release(MouseButton::Left);
        apply_input(&input, &mut state, 1.0);
        assert!(!state.scene().controls.is_dragging());
    }
}
