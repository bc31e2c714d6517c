//! Fullscreen front-end. The winit event loop owns the window and the pixel
//! surface on the main thread; the session runs on a worker thread and talks
//! to it through [`WindowRenderer`] and [`WindowResponses`].

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info, trace, warn};
use vsearch_core::{KeyPress, MessageScreen, SearchItem};
use vsearch_experiment::{Renderer, ResponseSource};
use vsearch_render::{CanvasStyle, DisplayGeometry, FontVec, SkiaRenderer};
use vsearch_timing::{Clock, HighPrecisionClock, Stopwatch};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::config::DisplayConfig;

/// What the worker asks the UI thread to put on screen.
#[derive(Debug, Clone)]
pub enum DisplayCommand {
    Blank,
    Search(Vec<SearchItem>),
    Message(MessageScreen),
    /// The session is over; leave the event loop.
    Exit,
}

/// A key press as seen by the UI thread.
#[derive(Debug, Clone)]
pub struct KeyInput {
    pub symbol: String,
    pub at: Instant,
}

/// Response symbol for a physical key, using the usual stimulus-software names.
pub fn key_symbol(code: KeyCode) -> Option<&'static str> {
    use KeyCode::*;
    let symbol = match code {
        ArrowLeft => "left",
        ArrowUp => "up",
        ArrowRight => "right",
        ArrowDown => "down",
        Space => "space",
        Enter | NumpadEnter => "return",
        Escape => "escape",
        KeyA => "a",
        KeyB => "b",
        KeyC => "c",
        KeyD => "d",
        KeyE => "e",
        KeyF => "f",
        KeyG => "g",
        KeyH => "h",
        KeyI => "i",
        KeyJ => "j",
        KeyK => "k",
        KeyL => "l",
        KeyM => "m",
        KeyN => "n",
        KeyO => "o",
        KeyP => "p",
        KeyQ => "q",
        KeyR => "r",
        KeyS => "s",
        KeyT => "t",
        KeyU => "u",
        KeyV => "v",
        KeyW => "w",
        KeyX => "x",
        KeyY => "y",
        KeyZ => "z",
        Digit0 | Numpad0 => "0",
        Digit1 | Numpad1 => "1",
        Digit2 | Numpad2 => "2",
        Digit3 | Numpad3 => "3",
        Digit4 | Numpad4 => "4",
        Digit5 | Numpad5 => "5",
        Digit6 | Numpad6 => "6",
        Digit7 | Numpad7 => "7",
        Digit8 | Numpad8 => "8",
        Digit9 | Numpad9 => "9",
        _ => return None,
    };
    Some(symbol)
}

pub struct SearchWindow {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    canvas: Option<SkiaRenderer>,
    display: DisplayConfig,
    style: CanvasStyle,
    font: Option<FontVec>,

    showing: DisplayCommand,
    ack_pending: bool,
    presented: Sender<Instant>,
    keys: Sender<KeyInput>,
    quit_key: String,
    closing: bool,
}

impl SearchWindow {
    pub fn new(
        display: DisplayConfig,
        style: CanvasStyle,
        font: Option<FontVec>,
        presented: Sender<Instant>,
        keys: Sender<KeyInput>,
        quit_key: String,
    ) -> Self {
        Self {
            window: None,
            pixels: None,
            canvas: None,
            display,
            style,
            font,
            showing: DisplayCommand::Blank,
            ack_pending: false,
            presented,
            keys,
            quit_key,
            closing: false,
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes()
            .with_title("Visual Search")
            .with_resizable(false);
        if self.display.fullscreen {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next());
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        let geometry = DisplayGeometry::from_monitor(
            size.width,
            size.height,
            self.display.monitor_width_cm,
            self.display.monitor_distance_cm,
        );
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            px_per_deg = geometry.px_per_deg,
            "display ready"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);
        self.canvas = Some(SkiaRenderer::new(
            geometry,
            self.style.clone(),
            self.font.take(),
        )?);

        window.set_cursor_visible(false);
        self.window = Some(window);
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let (Some(pixels), Some(canvas)) = (self.pixels.as_mut(), self.canvas.as_mut()) else {
            return Ok(());
        };
        match &self.showing {
            DisplayCommand::Blank | DisplayCommand::Exit => canvas.draw_blank(),
            DisplayCommand::Search(items) => canvas.draw_search(items),
            DisplayCommand::Message(screen) => canvas.draw_message(screen),
        }
        canvas.present(pixels.frame_mut())?;
        pixels.render()?;
        Ok(())
    }

    /// Draws the current command and tells the worker it is on screen.
    fn show(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.draw() {
            error!("failed to present frame: {e:#}");
            event_loop.exit();
            return;
        }
        if self.ack_pending {
            self.ack_pending = false;
            // A gone worker is noticed when it fails to send Exit
            let _ = self.presented.send(Instant::now());
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(size.width, size.height)?;
            pixels.resize_buffer(size.width, size.height)?;
        }
        if let Some(canvas) = &mut self.canvas {
            canvas.resize(size.width, size.height)?;
        }
        self.draw()
    }

    fn send_key(&self, symbol: &str) {
        let input = KeyInput {
            symbol: symbol.to_string(),
            at: Instant::now(),
        };
        if self.keys.send(input).is_err() {
            debug!(symbol, "key dropped, session already finished");
        }
    }
}

impl ApplicationHandler<DisplayCommand> for SearchWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window_and_surface(event_loop) {
            error!("failed to create window and surface: {e:#}");
            event_loop.exit();
            return;
        }
        // Commands may have arrived before the window existed
        self.show(event_loop);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, command: DisplayCommand) {
        if matches!(command, DisplayCommand::Exit) {
            if let Some(window) = &self.window {
                window.set_cursor_visible(true);
            }
            event_loop.exit();
            return;
        }
        trace!(?command, "display");
        self.showing = command;
        self.ack_pending = true;
        if self.canvas.is_some() {
            self.show(event_loop);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                // Stay alive until the worker has flushed and sent Exit
                if !self.closing {
                    self.closing = true;
                    info!("window closed, ending session");
                    let quit = self.quit_key.clone();
                    self.send_key(&quit);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.draw() {
                    warn!("redraw failed: {e:#}");
                }
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.handle_resize(size) {
                    warn!("resize failed: {e:#}");
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    match key_symbol(code) {
                        Some(symbol) => self.send_key(symbol),
                        None => trace!(?code, "unmapped key"),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Sends [`DisplayCommand::Exit`] when dropped, so the event loop ends even
/// if the session fails or panics.
pub struct ExitOnDrop(EventLoopProxy<DisplayCommand>);

impl ExitOnDrop {
    pub fn new(proxy: EventLoopProxy<DisplayCommand>) -> Self {
        Self(proxy)
    }
}

impl Drop for ExitOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send_event(DisplayCommand::Exit);
    }
}

/// Worker-side renderer. Each call returns once the UI thread has presented
/// the frame.
pub struct WindowRenderer {
    proxy: EventLoopProxy<DisplayCommand>,
    presented: Receiver<Instant>,
    clock: HighPrecisionClock,
}

impl WindowRenderer {
    pub fn new(proxy: EventLoopProxy<DisplayCommand>, presented: Receiver<Instant>) -> Self {
        Self {
            proxy,
            presented,
            clock: HighPrecisionClock::new(),
        }
    }

    fn show(&mut self, command: DisplayCommand) -> Result<Instant> {
        self.proxy
            .send_event(command)
            .map_err(|_| anyhow!("display closed"))?;
        self.presented
            .recv()
            .map_err(|_| anyhow!("display closed before presenting"))
    }
}

impl Renderer for WindowRenderer {
    fn blank(&mut self, duration: Duration) -> Result<()> {
        let shown = self.show(DisplayCommand::Blank)?;
        self.clock.sleep(duration.saturating_sub(shown.elapsed()));
        Ok(())
    }

    fn show_search(&mut self, items: &[SearchItem]) -> Result<()> {
        self.show(DisplayCommand::Search(items.to_vec()))?;
        Ok(())
    }

    fn show_message(&mut self, screen: &MessageScreen) -> Result<()> {
        self.show(DisplayCommand::Message(screen.clone()))?;
        Ok(())
    }
}

/// Worker-side response source fed by the UI thread's key events.
pub struct WindowResponses {
    keys: Receiver<KeyInput>,
    quit_key: String,
}

impl WindowResponses {
    pub fn new(keys: Receiver<KeyInput>, quit_key: String) -> Self {
        Self { keys, quit_key }
    }
}

impl ResponseSource for WindowResponses {
    fn wait_for(&mut self, allowed: &[String]) -> Result<KeyPress> {
        let watch = Stopwatch::arm();

        // Presses from before arming are discarded, except a pending quit
        for stale in self.keys.try_iter() {
            if stale.symbol == self.quit_key && allowed.contains(&stale.symbol) {
                return Ok(KeyPress::new(stale.symbol, Duration::ZERO));
            }
        }

        loop {
            match self.keys.recv() {
                Ok(input) if allowed.contains(&input.symbol) => {
                    let elapsed = watch.elapsed_until(input.at);
                    return Ok(KeyPress::new(input.symbol, elapsed));
                }
                Ok(input) => trace!(symbol = %input.symbol, "ignored key"),
                Err(_) => {
                    debug!("key channel closed, treating as quit");
                    return Ok(KeyPress::new(self.quit_key.clone(), watch.elapsed()));
                }
            }
        }
    }
}
