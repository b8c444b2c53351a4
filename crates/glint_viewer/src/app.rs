//! Windowed front end: winit event handling around a [`FrameDriver`].

use crate::presenter::Presenter;
use anyhow::Result;
use glint_renderer::{Display, FrameBuffer, FrameDriver, InputState};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Keyboard state turned into per-frame [`InputState`]s, plus the presenter.
pub struct WindowDisplay {
    presenter: Presenter,
    pending: InputState,
    left_held: bool,
    right_held: bool,
}

impl WindowDisplay {
    fn new(presenter: Presenter) -> Self {
        Self {
            presenter,
            pending: InputState::default(),
            left_held: false,
            right_held: false,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::ArrowLeft | KeyCode::KeyA => self.left_held = pressed,
            KeyCode::ArrowRight | KeyCode::KeyD => self.right_held = pressed,
            _ if !pressed => {}
            KeyCode::Escape => self.pending.quit = true,
            KeyCode::KeyS => self.pending.toggle_soft_shadows = true,
            KeyCode::KeyR => self.pending.toggle_reflections = true,
            KeyCode::KeyL => self.pending.toggle_logging = true,
            KeyCode::KeyM => self.pending.add_mesh = true,
            KeyCode::KeyN => self.pending.remove_mesh = true,
            _ => {}
        }
    }

    fn request_quit(&mut self) {
        self.pending.quit = true;
    }
}

impl Display for WindowDisplay {
    fn poll_input(&mut self) -> InputState {
        let mut input = std::mem::take(&mut self.pending);
        // Quit sticks until the loop acts on it
        self.pending.quit = input.quit;
        input.move_axis = i32::from(self.right_held) - i32::from(self.left_held);
        input
    }

    fn present(&mut self, buffer: &FrameBuffer) -> Result<()> {
        self.presenter.present(buffer)
    }
}

/// Application state
///
/// Field order matters: the driver (scene and render workers) is dropped
/// before the display and the window it draws into.
struct App {
    driver: Option<FrameDriver>,
    display: Option<WindowDisplay>,
    window: Option<Arc<Window>>,
    last_frame_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(driver: FrameDriver) -> Self {
        Self {
            driver: Some(driver),
            display: None,
            window: None,
            last_frame_time: Instant::now(),
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(driver) = &self.driver else {
            return Ok(());
        };
        let frame_size = (driver.buffer().width(), driver.buffer().height());

        let window_attrs = Window::default_attributes()
            .with_title("Glint")
            .with_inner_size(winit::dpi::PhysicalSize::new(frame_size.0, frame_size.1));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let presenter = pollster::block_on(Presenter::new(window.clone(), frame_size))?;

        self.display = Some(WindowDisplay::new(presenter));
        self.window = Some(window);
        self.last_frame_time = Instant::now();

        log::info!("Window and presenter initialized");
        log::info!("Keys: A/D or arrows move the light, S soft shadows, R reflections, L logging, M/N add/remove mesh, Esc quit");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(driver), Some(display)) = (self.driver.as_mut(), self.display.as_mut()) else {
            return;
        };

        let input = display.poll_input();
        if input.quit {
            event_loop.exit();
            return;
        }

        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        driver.run_frame(&input, dt);
        if let Err(e) = display.present(driver.buffer()) {
            self.fail(event_loop, e);
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                self.fail(event_loop, e.context("Failed to initialize the window"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                if let Some(display) = &mut self.display {
                    display.request_quit();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(display) = &mut self.display {
                    display.presenter.resize((physical_size.width, physical_size.height));
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(keycode),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(display) = &mut self.display {
                    display.handle_key(keycode, state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Join the render workers before any GPU resource goes away
        if let Some(driver) = self.driver.take() {
            log::info!("Shutting down {} render workers", driver.worker_count());
        }
        self.display.take();
        self.window.take();
    }
}

/// Open a window and render into it until the user quits.
pub fn run(driver: FrameDriver) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(driver);

    log::info!("Running event loop");
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
