//! Engine loop: window, renderer, timing and input delivery

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::core::{EngineEvent, EventQueue, KeyState, Time};
use crate::input::Input;
use crate::renderer::Renderer;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Target frames per second (0 for unlimited)
    pub target_fps: u32,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Physics Sandbox"),
            width: 1280,
            height: 720,
            target_fps: 60,
            vsync: true,
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set window dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Enable or disable VSync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once when the engine starts
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every frame for game logic updates
    fn update(&mut self, engine: &mut EngineContext);

    /// Called every frame for rendering
    fn render(&mut self, engine: &mut EngineContext);

    /// Called when the game is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// Input state
    pub input: Input,
    /// Window events, readable after the frame's `swap`
    pub events: EventQueue,
    /// Renderer (available after initialization)
    renderer: Option<Renderer>,
    /// Window size
    window_size: PhysicalSize<u32>,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    fn new(width: u32, height: u32) -> Self {
        Self {
            time: Time::new(),
            input: Input::new(),
            events: EventQueue::new(),
            renderer: None,
            window_size: PhysicalSize::new(width, height),
            should_quit: false,
        }
    }

    /// Get the renderer, once the window exists
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    /// Get the renderer mutably
    pub fn renderer_mut(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    /// Check if renderer is available
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Get window width
    pub fn width(&self) -> u32 {
        self.window_size.width
    }

    /// Get window height
    pub fn height(&self) -> u32 {
        self.window_size.height
    }

    /// Get aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.width as f32 / self.window_size.height.max(1) as f32
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    window: Option<Arc<Window>>,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.width, config.height);
        Self {
            config,
            game,
            context,
            window: None,
            initialized: false,
        }
    }

    /// Run the engine until the window closes
    ///
    /// # Errors
    ///
    /// Returns an error if the event loop cannot be created or fails
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        // The binary may have initialized logging already
        let _ = env_logger::try_init();
        log::info!("Starting engine: {}", self.config.title);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        Ok(())
    }
}

impl<G: Game> Engine<G> {
    /// Record an input event in the held-state tracker and the event queue
    fn push_input(&mut self, event: EngineEvent) {
        self.context.input.process_event(&event);
        self.context.events.push(event);
    }
}

impl<G: Game> ApplicationHandler for Engine<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(Arc::clone(&window), self.config.vsync)) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to create renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        self.context.renderer = Some(renderer);
        self.window = Some(window);

        // Initialize game
        if !self.initialized {
            self.game.init(&mut self.context);
            self.initialized = true;
            log::info!("Engine initialized successfully");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                self.game.shutdown(&mut self.context);
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.context.window_size = new_size;
                    if let Some(renderer) = &mut self.context.renderer {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    self.context.events.push(EngineEvent::Resized {
                        width: new_size.width,
                        height: new_size.height,
                    });
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.push_input(EngineEvent::Keyboard {
                        key,
                        state: KeyState::from_winit(event.state, event.repeat),
                    });
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.push_input(EngineEvent::MouseButton {
                    button,
                    pressed: state.is_pressed(),
                });
            }

            WindowEvent::RedrawRequested => {
                self.context.time.update();
                self.context.events.swap();

                // Update game logic
                self.game.update(&mut self.context);

                // Check if should quit
                if self.context.should_quit() {
                    self.game.shutdown(&mut self.context);
                    event_loop.exit();
                    return;
                }

                // Render
                self.game.render(&mut self.context);

                // Clear per-frame input edges
                self.context.input.begin_frame();

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::default()
            .with_title("Sandbox")
            .with_size(800, 600)
            .with_target_fps(30)
            .with_vsync(false);
        assert_eq!(config.title, "Sandbox");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.target_fps, 30);
        assert!(!config.vsync);
    }

    #[test]
    fn test_context_without_window() {
        let mut ctx = EngineContext::new(800, 0);
        assert!(ctx.renderer().is_none());
        assert!(!ctx.has_renderer());
        assert_eq!(ctx.aspect_ratio(), 800.0);

        assert!(!ctx.should_quit());
        ctx.quit();
        assert!(ctx.should_quit());
    }
}
